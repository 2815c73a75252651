use super::FromUri;
use crate::error::Result;
use crate::file_name_map::FileNameMap;
use crate::media_type::MediaType;
use crate::uri;
use std::sync::Arc;
use url::Url;

/// Looks the URI's file name up in a [`FileNameMap`].
#[derive(Debug, Clone)]
pub struct FileNameMapDetector {
    map: Arc<FileNameMap>,
}

impl FileNameMapDetector {
    pub fn new(map: Arc<FileNameMap>) -> Self {
        Self { map }
    }
}

impl FromUri for FileNameMapDetector {
    fn name(&self) -> &str {
        "file-name-map"
    }

    fn from_uri(&self, uri: &Url) -> Result<Option<MediaType>> {
        Ok(self.map.content_type_for(&uri::file_name(uri)))
    }
}

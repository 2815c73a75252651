use super::FromUri;
use crate::error::Result;
use crate::media_type::MediaType;
use crate::uri;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use url::Url;

/// Sniffs the magic bytes of local files.
///
/// Only URIs whose scheme is one of the probe's filesystem schemes are
/// looked at; by default that is `file` alone. A path that does not exist is
/// no answer, while any other failure to stat or read it is an error.
#[derive(Debug, Clone)]
pub struct FileContentProbe {
    schemes: BTreeSet<String>,
}

impl FileContentProbe {
    /// A probe for `file` plus `extra_schemes`, whose URI paths are read as
    /// local absolute paths.
    pub fn with_schemes<I, S>(extra_schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schemes: BTreeSet<String> = extra_schemes
            .into_iter()
            .map(|s| s.as_ref().to_ascii_lowercase())
            .collect();
        schemes.insert("file".to_string());
        Self { schemes }
    }

    pub fn handles(&self, scheme: &str) -> bool {
        self.schemes.contains(&scheme.to_ascii_lowercase())
    }
}

impl Default for FileContentProbe {
    fn default() -> Self {
        Self::with_schemes(std::iter::empty::<&str>())
    }
}

impl FromUri for FileContentProbe {
    fn name(&self) -> &str {
        "file-content-probe"
    }

    fn from_uri(&self, uri: &Url) -> Result<Option<MediaType>> {
        if !self.handles(uri.scheme()) {
            return Ok(None);
        }
        let Some(path) = uri::to_file_path(uri) else {
            return Ok(None);
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(infer::get_from_path(&path)?.map(|kind| MediaType::parse_lenient(kind.mime_type())))
    }
}

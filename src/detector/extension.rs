use super::FromUri;
use crate::error::Result;
use crate::extension_table::ExtensionTable;
use crate::media_type::MediaType;
use crate::uri;
use std::sync::Arc;
use url::Url;

/// Looks the URI's file extension up in an [`ExtensionTable`].
#[derive(Debug, Clone)]
pub struct ExtensionTableDetector {
    table: Arc<ExtensionTable>,
}

impl ExtensionTableDetector {
    pub fn new(table: Arc<ExtensionTable>) -> Self {
        Self { table }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(ExtensionTable::standard()))
    }
}

impl FromUri for ExtensionTableDetector {
    fn name(&self) -> &str {
        "extension-table"
    }

    fn from_uri(&self, uri: &Url) -> Result<Option<MediaType>> {
        let ext = uri::file_extension(uri);
        if ext.is_empty() {
            return Ok(None);
        }
        Ok(self.table.first(&ext).cloned())
    }
}

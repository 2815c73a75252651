//! Detectors that infer a media type from a URI alone, and the ordered chain
//! the resolver runs them in.

mod extension;
mod file_name;
mod probe;

pub use extension::ExtensionTableDetector;
pub use file_name::FileNameMapDetector;
pub use probe::FileContentProbe;

use crate::error::Result;
use crate::extension_table::ExtensionTable;
use crate::file_name_map::{system_file_name_map, FileNameMap};
use crate::media_type::MediaType;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Determines a media type from a URI, e.g. from its file name extension or
/// through the file system.
///
/// `Ok(None)` means "no opinion". Errors are reserved for broken resources,
/// such as a path that exists but cannot be stat'ed.
pub trait FromUri: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn from_uri(&self, uri: &Url) -> Result<Option<MediaType>>;
}

/// Closures make ad-hoc detectors.
impl<F> FromUri for F
where
    F: Fn(&Url) -> Result<Option<MediaType>> + Send + Sync,
{
    fn name(&self) -> &str {
        "closure"
    }

    fn from_uri(&self, uri: &Url) -> Result<Option<MediaType>> {
        self(uri)
    }
}

/// Detectors tried in a fixed order; the first answer wins.
#[derive(Clone, Default)]
pub struct DetectorChain {
    detectors: Vec<Arc<dyn FromUri>>,
}

impl DetectorChain {
    pub fn new(detectors: Vec<Arc<dyn FromUri>>) -> Self {
        Self { detectors }
    }

    /// The reference chain over the system file name map, a `file:` probe and
    /// the standard extension table.
    pub fn reference() -> Self {
        Self::reference_with(
            system_file_name_map(),
            FileContentProbe::default(),
            Arc::new(ExtensionTable::standard()),
        )
    }

    /// File name map, then file content probe, then extension table.
    pub fn reference_with(
        file_name_map: Arc<FileNameMap>,
        probe: FileContentProbe,
        extension_table: Arc<ExtensionTable>,
    ) -> Self {
        Self::new(vec![
            Arc::new(FileNameMapDetector::new(file_name_map)),
            Arc::new(probe),
            Arc::new(ExtensionTableDetector::new(extension_table)),
        ])
    }

    /// Appends a detector with the lowest priority so far.
    pub fn push(&mut self, detector: Arc<dyn FromUri>) {
        self.detectors.push(detector);
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Runs the detectors in order and returns the first answer.
    ///
    /// Later detectors are not consulted once one has answered, and an error
    /// from any detector ends the run.
    pub fn detect(&self, uri: &Url) -> Result<Option<MediaType>> {
        for detector in &self.detectors {
            if let Some(media_type) = detector.from_uri(uri)? {
                tracing::debug!(
                    detector = detector.name(),
                    %uri,
                    %media_type,
                    "detected media type"
                );
                return Ok(Some(media_type));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for DetectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

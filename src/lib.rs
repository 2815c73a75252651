//! Media type resolution for resources, with an async-friendly surface.
//!
//! Given a resource's URI, an optional declared content type and encoding,
//! and optionally its bytes, this crate works out the single best media type
//! and charset:
//! - A declared type is trusted unless it is known to be wrong or too vague
//! - An ordered chain of URI detectors (file name map, file content probe,
//!   extension table) fills the gap; the first answer wins
//! - `application/octet-stream` is the last resort, never "unknown"
//! - Charsets are forced from a declared encoding, defaulted for text and
//!   JSON, or sniffed from content for families such as YAML
//!
//! Resolution is synchronous and may block on the filesystem; the [`task`]
//! module runs it on tokio's blocking pool.
//!
//! ```
//! use tokio_mediatype::MediaTypeDetector;
//! use url::Url;
//!
//! let detector = MediaTypeDetector::new();
//! let uri = Url::parse("https://example.com/readme").unwrap();
//! let media_type = detector.resolve(Some("content/unknown"), None, Some(&uri)).unwrap();
//! assert_eq!(media_type.to_string(), "application/octet-stream");
//! ```

pub mod byte_source;
pub mod charset;
pub mod detector;
pub mod error;
pub mod extension_table;
pub mod file_name_map;
pub mod media_type;
pub mod resolver;
pub mod task;
pub mod uri;

#[cfg(unix)]
mod platform;

#[cfg(windows)]
mod platform;

// Re-export commonly used types
pub use byte_source::{ByteSource, DataUriSource, EmptySource, FileSource};
pub use charset::{CharsetRefiner, CharsetSniffer, YamlCharsetSniffer};
pub use detector::{DetectorChain, FromUri};
pub use error::{Error, Result};
pub use extension_table::ExtensionTable;
pub use file_name_map::{system_file_name_map, FileNameMap};
pub use media_type::{format_media_type, parse_media_type, MediaType};
pub use resolver::{MediaTypeDetector, MediaTypeDetectorBuilder};

//! Charset refinement from resource content.
//!
//! Sniffers are registered per content family. The refiner picks a family by
//! the URI's file extension or the resolved media type and lets that family's
//! sniffer look at the bytes.

mod yaml;

pub use yaml::YamlCharsetSniffer;

use crate::byte_source::ByteSource;
use crate::error::{Error, Result};
use crate::media_type::MediaType;
use crate::uri;
use encoding_rs::Encoding;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::sync::Arc;
use url::Url;

/// Charsets that are valid to declare but that `encoding_rs` cannot decode.
const EXTRA_CHARSETS: &[&str] = &["UTF-32", "UTF-32BE", "UTF-32LE"];

/// Checks that `name` labels a known charset.
///
/// A label that spells the charset's own name, in any case, comes back in
/// canonical form. Aliases are returned as given, trimmed: the WHATWG label
/// table folds e.g. `ISO-8859-1` into `windows-1252`, and a declared
/// `ISO-8859-1` has to stay what it says.
///
/// # Examples
///
/// ```
/// use tokio_mediatype::charset::validate_charset;
///
/// assert_eq!(validate_charset("utf-8").unwrap(), "UTF-8");
/// assert_eq!(validate_charset("shift_jis").unwrap(), "Shift_JIS");
/// assert_eq!(validate_charset(" ISO-8859-1 ").unwrap(), "ISO-8859-1");
/// assert_eq!(validate_charset("utf-32le").unwrap(), "UTF-32LE");
/// assert!(validate_charset("klingon-8").is_err());
/// ```
pub fn validate_charset(name: &str) -> Result<&str> {
    let name = name.trim();
    if let Some(encoding) = Encoding::for_label(name.as_bytes()) {
        let canonical = encoding.name();
        return Ok(if canonical.eq_ignore_ascii_case(name) {
            canonical
        } else {
            name
        });
    }
    EXTRA_CHARSETS
        .iter()
        .find(|cs| cs.eq_ignore_ascii_case(name))
        .copied()
        .ok_or_else(|| Error::UnsupportedCharset(name.to_string()))
}

/// Finds the charset of one family of content by looking at its bytes.
pub trait CharsetSniffer: Send + Sync {
    /// Name of the content family, e.g. `yaml`.
    fn family(&self) -> &str;

    /// Media types, without parameters, belonging to the family.
    fn media_types(&self) -> Vec<MediaType>;

    /// File extensions, without dot, belonging to the family.
    fn extensions(&self) -> Vec<String>;

    /// Returns the charset name if the content reveals one.
    fn sniff(&self, bytes: &dyn ByteSource) -> io::Result<Option<String>>;
}

/// Registry of [`CharsetSniffer`]s keyed by content family.
#[derive(Clone, Default)]
pub struct CharsetRefiner {
    sniffers: BTreeMap<String, Arc<dyn CharsetSniffer>>,
    by_type: HashMap<MediaType, String>,
    by_extension: HashMap<String, String>,
}

impl CharsetRefiner {
    /// A refiner without any sniffer; it never changes anything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A refiner with the YAML sniffer.
    pub fn standard() -> Self {
        let mut refiner = Self::empty();
        refiner.register(Arc::new(YamlCharsetSniffer));
        refiner
    }

    /// Adds `sniffer`, replacing any earlier sniffer of the same family.
    /// Types and extensions claimed by several families go to the latest.
    pub fn register(&mut self, sniffer: Arc<dyn CharsetSniffer>) {
        let family = sniffer.family().to_string();
        for media_type in sniffer.media_types() {
            self.by_type.insert(media_type.without_parameters(), family.clone());
        }
        for ext in sniffer.extensions() {
            self.by_extension.insert(ext.to_ascii_lowercase(), family.clone());
        }
        self.sniffers.insert(family, sniffer);
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.sniffers.keys().map(String::as_str)
    }

    /// The family responsible for a resource, by file extension first and
    /// media type second.
    pub fn family_for(&self, uri: &Url, media_type: &MediaType) -> Option<&str> {
        let ext = uri::file_extension(uri).to_ascii_lowercase();
        self.by_extension
            .get(&ext)
            .or_else(|| self.by_type.get(&media_type.without_parameters()))
            .map(String::as_str)
    }

    /// Fills in a missing charset from `bytes`.
    ///
    /// A media type that already has a charset is returned unchanged, as is
    /// one for which no sniffer applies or whose content does not tell.
    /// Unreadable content counts as content that does not tell.
    pub fn refine(&self, uri: &Url, bytes: &dyn ByteSource, media_type: MediaType) -> MediaType {
        if media_type.charset().is_some() {
            return media_type;
        }
        let Some(sniffer) = self
            .family_for(uri, &media_type)
            .and_then(|family| self.sniffers.get(family))
        else {
            return media_type;
        };

        match sniffer.sniff(bytes) {
            Ok(Some(charset)) => {
                tracing::debug!(
                    family = sniffer.family(),
                    %uri,
                    charset = %charset,
                    "sniffed charset"
                );
                media_type.with_charset(&charset)
            }
            Ok(None) => media_type,
            Err(err) => {
                tracing::debug!(
                    family = sniffer.family(),
                    %uri,
                    error = %err,
                    "content unreadable, charset left unset"
                );
                media_type
            }
        }
    }
}

impl fmt::Debug for CharsetRefiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharsetRefiner")
            .field("families", &self.sniffers.keys().collect::<Vec<_>>())
            .finish()
    }
}

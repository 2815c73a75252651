//! Resolution of the single best media type for a resource.
//!
//! A declared content type (e.g. from a transport header) is trusted unless it
//! is known to be wrong ([`IGNORE`]) or known to be vague ([`TRY_FIXING`]);
//! otherwise the URI's detector chain decides, and `application/octet-stream`
//! is the last resort. Charsets are then forced, defaulted or sniffed.

use crate::byte_source::{ByteSource, EmptySource};
use crate::charset::{validate_charset, CharsetRefiner};
use crate::detector::{DetectorChain, FileContentProbe, FromUri};
use crate::error::Result;
use crate::extension_table::ExtensionTable;
use crate::file_name_map::{system_file_name_map, FileNameMap};
use crate::media_type::{MediaType, JSON, UTF_8};
use crate::uri;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::sync::Arc;
use url::Url;

/// Declared types known to be wrong; never returned as-is.
pub static IGNORE: Lazy<BTreeSet<MediaType>> = Lazy::new(|| {
    // reported by some HTTP clients for responses without Content-Type
    BTreeSet::from([MediaType::new("content", "unknown")])
});

/// Declared types too generic to trust when a detector knows better.
pub static TRY_FIXING: Lazy<BTreeSet<MediaType>> = Lazy::new(|| {
    // raw.githubusercontent.com serves e.g. *.yaml as text/plain
    BTreeSet::from([MediaType::new("text", "plain")])
});

/// Resolves media types for resources.
///
/// Stateless apart from its configuration; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MediaTypeDetector {
    chain: DetectorChain,
    ignore: BTreeSet<MediaType>,
    try_fixing: BTreeSet<MediaType>,
    default_type: MediaType,
    refiner: CharsetRefiner,
}

impl Default for MediaTypeDetector {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MediaTypeDetector {
    /// The reference configuration: system file name map, `file:` content
    /// probe, standard extension table, YAML charset sniffing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MediaTypeDetectorBuilder {
        MediaTypeDetectorBuilder::default()
    }

    pub fn chain(&self) -> &DetectorChain {
        &self.chain
    }

    pub fn refiner(&self) -> &CharsetRefiner {
        &self.refiner
    }

    /// Computes the media type from a declared content type, a declared
    /// content encoding and the resource's URI.
    ///
    /// A declared encoding always becomes the charset. Without one, `text/*`,
    /// `application/json` and `+json` types default to UTF-8 when they carry
    /// no charset yet.
    ///
    /// # Errors
    ///
    /// Fails when a detector cannot probe the resource (`Error::Io`) or when
    /// the declared encoding is not a known charset (`Error::UnsupportedCharset`).
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_mediatype::MediaTypeDetector;
    /// use url::Url;
    ///
    /// let detector = MediaTypeDetector::new();
    /// let uri = Url::parse("https://example.com/data/people.json").unwrap();
    /// let media_type = detector.resolve(Some("text/plain"), None, Some(&uri)).unwrap();
    /// assert_eq!(media_type.to_string(), "application/json; charset=UTF-8");
    /// ```
    pub fn resolve(
        &self,
        content_type: Option<&str>,
        content_encoding: Option<&str>,
        uri: Option<&Url>,
    ) -> Result<MediaType> {
        let declared = content_type.map(MediaType::parse_lenient);

        let mut media_type = declared.clone().filter(|declared| {
            let essence = declared.without_parameters();
            !self.ignore.contains(&essence) && !self.try_fixing.contains(&essence)
        });

        if media_type.is_none() {
            if let Some(uri) = uri {
                media_type = self.chain.detect(uri)?;
            }
        }

        let media_type = match (media_type, declared) {
            (Some(media_type), _) => media_type,
            (None, Some(declared)) if !self.ignore.contains(&declared.without_parameters()) => {
                declared
            }
            _ => self.default_type.clone(),
        };

        match content_encoding {
            Some(encoding) => Ok(media_type.with_charset(validate_charset(encoding)?)),
            None => Ok(Self::default_charset(media_type)),
        }
    }

    /// Adjusts an already known media type with what the URI itself says.
    ///
    /// A media type or charset embedded in the URI wins over `original`.
    /// Failing that, the original charset is kept, or sniffed as far as
    /// possible without content.
    ///
    /// # Errors
    ///
    /// Fails with `Error::UnsupportedCharset` when the URI embeds a charset
    /// that names no known charset.
    pub fn overwrite(&self, uri: &Url, original: &MediaType) -> Result<MediaType> {
        let embedded = uri::media_type_and_charset(uri);

        let mut media_type = match embedded.media_type.as_deref() {
            Some(embedded) => MediaType::parse_lenient(embedded),
            None => original.clone(),
        };
        if let Some(charset) = embedded.charset.as_deref() {
            media_type = media_type.with_charset(validate_charset(charset)?);
        }

        if media_type.charset().is_none() {
            if let Some(charset) = original.charset() {
                return Ok(media_type.with_charset(charset));
            }
        }
        Ok(self.refiner.refine(uri, &EmptySource, media_type))
    }

    /// Determines the media type of a resource from its URI and content.
    ///
    /// A media type and charset embedded in the URI count as declared, then
    /// a still missing charset is sniffed from `bytes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_mediatype::MediaTypeDetector;
    /// use url::Url;
    ///
    /// let detector = MediaTypeDetector::new();
    /// let uri = Url::parse("https://example.com/config.yaml").unwrap();
    /// let bytes: &[u8] = b"\xFF\xFEk\x00";
    /// let media_type = detector.detect(&uri, &bytes).unwrap();
    /// assert_eq!(media_type.to_string(), "application/yaml; charset=UTF-16LE");
    /// ```
    pub fn detect(&self, uri: &Url, bytes: &dyn ByteSource) -> Result<MediaType> {
        let embedded = uri::media_type_and_charset(uri);
        let resolved = self.resolve(
            embedded.media_type.as_deref(),
            embedded.charset.as_deref(),
            Some(uri),
        )?;
        Ok(self.refiner.refine(uri, bytes, resolved))
    }

    fn default_charset(media_type: MediaType) -> MediaType {
        if media_type.charset().is_some() {
            return media_type;
        }
        let utf8_by_default = media_type.type_() == "text"
            || media_type.essence() == JSON
            || media_type.has_suffix("json");
        if utf8_by_default {
            media_type.with_charset(UTF_8)
        } else {
            media_type
        }
    }
}

/// Configures a [`MediaTypeDetector`].
///
/// Unset parts take the reference configuration. An explicit detector list
/// replaces the whole chain, in which case the file name map, extension table
/// and filesystem schemes are unused.
#[derive(Default)]
pub struct MediaTypeDetectorBuilder {
    detectors: Option<Vec<Arc<dyn FromUri>>>,
    file_name_map: Option<Arc<FileNameMap>>,
    extension_table: Option<Arc<ExtensionTable>>,
    filesystem_schemes: Vec<String>,
    ignore: Option<BTreeSet<MediaType>>,
    try_fixing: Option<BTreeSet<MediaType>>,
    default_type: Option<MediaType>,
    refiner: Option<CharsetRefiner>,
}

impl MediaTypeDetectorBuilder {
    /// Replaces the detector chain.
    pub fn detectors(mut self, detectors: Vec<Arc<dyn FromUri>>) -> Self {
        self.detectors = Some(detectors);
        self
    }

    /// The file name map of the first detector; the system map otherwise.
    pub fn file_name_map(mut self, map: FileNameMap) -> Self {
        self.file_name_map = Some(Arc::new(map));
        self
    }

    /// The extension table of the last detector; the standard one otherwise.
    pub fn extension_table(mut self, table: ExtensionTable) -> Self {
        self.extension_table = Some(Arc::new(table));
        self
    }

    /// Another URI scheme whose paths the content probe reads as local files.
    pub fn filesystem_scheme(mut self, scheme: &str) -> Self {
        self.filesystem_schemes.push(scheme.to_string());
        self
    }

    /// Replaces the ignore set.
    pub fn ignore<I: IntoIterator<Item = MediaType>>(mut self, types: I) -> Self {
        self.ignore = Some(types.into_iter().map(|t| t.without_parameters()).collect());
        self
    }

    /// Replaces the try-fixing set.
    pub fn try_fixing<I: IntoIterator<Item = MediaType>>(mut self, types: I) -> Self {
        self.try_fixing = Some(types.into_iter().map(|t| t.without_parameters()).collect());
        self
    }

    /// The type of last resort; `application/octet-stream` otherwise.
    pub fn default_type(mut self, media_type: MediaType) -> Self {
        self.default_type = Some(media_type);
        self
    }

    pub fn charset_refiner(mut self, refiner: CharsetRefiner) -> Self {
        self.refiner = Some(refiner);
        self
    }

    pub fn build(self) -> MediaTypeDetector {
        let chain = match self.detectors {
            Some(detectors) => DetectorChain::new(detectors),
            None => DetectorChain::reference_with(
                self.file_name_map.unwrap_or_else(system_file_name_map),
                FileContentProbe::with_schemes(self.filesystem_schemes),
                self.extension_table
                    .unwrap_or_else(|| Arc::new(ExtensionTable::standard())),
            ),
        };

        MediaTypeDetector {
            chain,
            ignore: self.ignore.unwrap_or_else(|| IGNORE.clone()),
            try_fixing: self.try_fixing.unwrap_or_else(|| TRY_FIXING.clone()),
            default_type: self.default_type.unwrap_or_else(MediaType::octet_stream),
            refiner: self.refiner.unwrap_or_else(CharsetRefiner::standard),
        }
    }
}

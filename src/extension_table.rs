//! Extension to media type registrations contributed by format providers.
//!
//! Unlike the [`FileNameMap`](crate::FileNameMap), an extension here may map
//! to several types. [`ExtensionTable::first`] settles such ties
//! deterministically: the earliest registration wins. All candidates remain
//! available through [`ExtensionTable::types_for`].

use crate::error::{Error, Result};
use crate::media_type::MediaType;
use std::collections::BTreeMap;

/// Registrations of the standard table, in order.
static STANDARD: &[(&str, &str)] = &[
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("json", "application/json"),
    ("jsonld", "application/ld+json"),
    ("md", "text/markdown"),
    ("ttl", "text/turtle"),
    ("nt", "application/n-triples"),
    ("nq", "application/n-quads"),
    ("trig", "application/trig"),
    ("rdf", "application/rdf+xml"),
    ("textproto", "text/protobuf"),
    ("binpb", "application/protobuf"),
    ("gexf", "application/gexf+xml"),
    ("csv", "text/csv"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: BTreeMap<String, Vec<MediaType>>,
}

impl ExtensionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table of formats this crate knows about.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (ext, mime) in STANDARD {
            table.entries
                .entry(ext.to_string())
                .or_insert_with(Vec::new)
                .push(MediaType::parse_lenient(mime));
        }
        table
    }

    /// Registers `media_type` for `ext`, given with or without a leading dot.
    ///
    /// Extensions are case-insensitive and parameters are dropped.
    /// Registering the same pair twice keeps the first registration.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_mediatype::{ExtensionTable, MediaType};
    ///
    /// let mut table = ExtensionTable::new();
    /// table.register(".XML", MediaType::new("application", "xml")).unwrap();
    /// table.register("xml", MediaType::new("text", "xml")).unwrap();
    /// assert_eq!(table.first("xml"), Some(&MediaType::new("application", "xml")));
    /// assert_eq!(table.types_for("Xml").len(), 2);
    /// ```
    pub fn register(&mut self, ext: &str, media_type: MediaType) -> Result<()> {
        let key = normalize(ext);
        if key.is_empty() || key.contains(['/', '.']) {
            return Err(Error::MimeType(format!("invalid extension {:?}", ext)));
        }
        let media_type = media_type.without_parameters();
        let types = self.entries.entry(key).or_insert_with(Vec::new);
        if !types.contains(&media_type) {
            types.push(media_type);
        }
        Ok(())
    }

    /// Every type registered for `ext`, in registration order.
    pub fn types_for(&self, ext: &str) -> &[MediaType] {
        self.entries
            .get(&normalize(ext))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The earliest registered type for `ext`.
    pub fn first(&self, ext: &str) -> Option<&MediaType> {
        let types = self.types_for(ext);
        if types.len() > 1 {
            tracing::debug!(
                extension = ext,
                candidates = types.len(),
                chosen = %types[0],
                "ambiguous extension, using earliest registration"
            );
        }
        types.first()
    }

    /// Extensions with more than one registered type.
    pub fn ambiguous(&self) -> impl Iterator<Item = (&str, &[MediaType])> {
        self.entries
            .iter()
            .filter(|(_, types)| types.len() > 1)
            .map(|(ext, types)| (ext.as_str(), types.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let table = ExtensionTable::standard();
        assert_eq!(table.first("yaml"), Some(&MediaType::new("application", "yaml")));
        assert_eq!(table.first("YML"), Some(&MediaType::new("application", "yaml")));
        assert_eq!(table.first(".jsonld"), Some(&MediaType::new("application", "ld+json")));
        assert_eq!(table.first(""), None);
        assert_eq!(table.ambiguous().count(), 0);
    }

    #[test]
    fn test_earliest_registration_wins() {
        let mut table = ExtensionTable::new();
        table.register("ttl", MediaType::new("text", "turtle")).unwrap();
        table.register("ttl", MediaType::new("application", "x-turtle")).unwrap();
        table.register("ttl", MediaType::new("text", "turtle")).unwrap();

        assert_eq!(table.first("ttl"), Some(&MediaType::new("text", "turtle")));
        assert_eq!(
            table.types_for("ttl"),
            &[MediaType::new("text", "turtle"), MediaType::new("application", "x-turtle")]
        );
        let ambiguous: Vec<_> = table.ambiguous().map(|(ext, _)| ext).collect();
        assert_eq!(ambiguous, vec!["ttl"]);
    }

    #[test]
    fn test_register_drops_parameters() {
        let mut table = ExtensionTable::new();
        table
            .register("txt", MediaType::new("text", "plain").with_charset("utf-8"))
            .unwrap();
        assert_eq!(table.first("txt"), Some(&MediaType::new("text", "plain")));
    }

    #[test]
    fn test_register_rejects_invalid_extension() {
        let mut table = ExtensionTable::new();
        assert!(table.register("", MediaType::octet_stream()).is_err());
        assert!(table.register(".", MediaType::octet_stream()).is_err());
        assert!(table.register("tar.gz", MediaType::octet_stream()).is_err());
        assert!(table.is_empty());
    }
}

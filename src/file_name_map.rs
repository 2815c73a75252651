//! The host's file name to media type table.
//!
//! The built-in table is small but [`FileNameMap::system`] augments it with
//! the local system's MIME-info database or mime.types file(s) if available
//! under one or more of these names:
//! - /usr/local/share/mime/globs2
//! - /usr/share/mime/globs2
//! - /etc/mime.types
//! - /etc/apache2/mime.types
//! - /etc/apache/mime.types
//!
//! On Windows, types are extracted from the registry.
//!
//! Entries never carry parameters; charset defaults are the resolver's job.

use crate::error::{Error, Result};
use crate::media_type::{parse_media_type, MediaType};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in mappings (all lowercase extensions).
static BUILTIN_TYPES_LOWER: &[(&str, &str)] = &[
    (".avif", "image/avif"),
    (".css", "text/css"),
    (".csv", "text/csv"),
    (".gif", "image/gif"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".js", "text/javascript"),
    (".json", "application/json"),
    (".jsonld", "application/ld+json"),
    (".md", "text/markdown"),
    (".mjs", "text/javascript"),
    (".pdf", "application/pdf"),
    (".png", "image/png"),
    (".svg", "image/svg+xml"),
    (".txt", "text/plain"),
    (".wasm", "application/wasm"),
    (".webp", "image/webp"),
    (".xml", "text/xml"),
    (".yaml", "application/yaml"),
    (".yml", "application/yaml"),
];

static SYSTEM: Lazy<Arc<FileNameMap>> = Lazy::new(|| Arc::new(FileNameMap::system()));

/// Maps file name extensions to media types.
#[derive(Debug, Clone, Default)]
pub struct FileNameMap {
    /// Case-sensitive, e.g. ".Z" => "application/x-compress"
    types: HashMap<String, String>,
    /// Lower-cased, e.g. ".z" => "application/x-compress"
    types_lower: HashMap<String, String>,
}

impl FileNameMap {
    /// A map holding only the built-in table; independent of the host.
    pub fn builtin() -> Self {
        let mut map = Self::default();
        for (ext, mime) in BUILTIN_TYPES_LOWER {
            map.types.insert(ext.to_string(), mime.to_string());
            map.types_lower.insert(ext.to_string(), mime.to_string());
        }
        map
    }

    /// The built-in table augmented by the platform's databases.
    ///
    /// Platform entries never override built-in ones. Unreadable databases
    /// are skipped.
    pub fn system() -> Self {
        #[allow(unused_mut)]
        let mut map = Self::builtin();
        #[cfg(any(unix, windows))]
        if let Err(err) = crate::platform::load_into(&mut map) {
            tracing::debug!(error = %err, "platform MIME database not loaded");
        }
        map
    }

    /// Returns the media type for a file name, judged by its extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_mediatype::FileNameMap;
    ///
    /// let map = FileNameMap::builtin();
    /// assert_eq!(map.content_type_for("index.HTML").unwrap().essence(), "text/html");
    /// assert_eq!(map.content_type_for("README"), None);
    /// ```
    pub fn content_type_for(&self, file_name: &str) -> Option<MediaType> {
        let dot = file_name.rfind('.')?;
        let ext = &file_name[dot..];
        if ext.len() < 2 {
            return None;
        }
        self.type_by_extension(ext)
            .map(|mime| MediaType::parse_lenient(&mime))
    }

    /// Returns the type associated with `ext`, which begins with a dot as in
    /// ".html". Looked up case-sensitively first, then case-insensitively.
    pub fn type_by_extension(&self, ext: &str) -> Option<String> {
        if let Some(mime) = self.types.get(ext) {
            return Some(mime.clone());
        }
        self.types_lower.get(&ext.to_lowercase()).cloned()
    }

    /// Sets the type for `ext`, overriding any previous mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_mediatype::FileNameMap;
    ///
    /// let mut map = FileNameMap::builtin();
    /// map.add_extension_type(".ttl", "text/turtle").unwrap();
    /// assert_eq!(map.type_by_extension(".TTL"), Some("text/turtle".to_string()));
    /// assert!(map.add_extension_type("ttl", "text/turtle").is_err());
    /// ```
    pub fn add_extension_type(&mut self, ext: &str, mime_type: &str) -> Result<()> {
        self.set_extension_type(ext, mime_type, false)
    }

    /// Like [`FileNameMap::add_extension_type`] but keeps an existing mapping.
    pub(crate) fn add_extension_type_if_absent(
        &mut self,
        ext: &str,
        mime_type: &str,
    ) -> Result<()> {
        self.set_extension_type(ext, mime_type, true)
    }

    fn set_extension_type(
        &mut self,
        ext: &str,
        mime_type: &str,
        skip_if_exists: bool,
    ) -> Result<()> {
        if !ext.starts_with('.') {
            return Err(Error::MimeType(format!(
                "extension {:?} missing leading dot",
                ext
            )));
        }

        let ext_lower = ext.to_lowercase();
        if skip_if_exists && self.types_lower.contains_key(&ext_lower) {
            return Ok(());
        }

        // Parameters are dropped; only the essence is stored
        let (just_type, _) = parse_media_type(mime_type)?;

        self.types.insert(ext.to_string(), just_type.clone());
        self.types_lower.insert(ext_lower, just_type);

        Ok(())
    }
}

/// The process-wide system map, built on first use.
pub fn system_file_name_map() -> Arc<FileNameMap> {
    Arc::clone(&SYSTEM)
}

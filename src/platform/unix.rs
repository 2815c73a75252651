//! Unix-specific file name map loading.
//!
//! Implements loading from:
//! - FreeDesktop Shared MIME-info Database (globs2 format)
//! - Traditional mime.types files

use crate::error::Result;
use crate::file_name_map::FileNameMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Paths to FreeDesktop Shared MIME-info Database globs2 files.
const MIME_GLOBS: &[&str] = &[
    "/usr/local/share/mime/globs2",
    "/usr/share/mime/globs2",
];

/// Common locations for mime.types files on Unix.
const TYPE_FILES: &[&str] = &[
    "/etc/mime.types",
    "/etc/apache2/mime.types",
    "/etc/apache/mime.types",
    "/etc/httpd/conf/mime.types",
];

pub(super) fn load_unix(map: &mut FileNameMap) -> Result<()> {
    for filename in MIME_GLOBS {
        if let Ok(file) = File::open(filename) {
            tracing::debug!(path = filename, "loading MIME globs");
            // The first database found is authoritative
            return read_globs(map, BufReader::new(file));
        }
    }

    for filename in TYPE_FILES {
        if let Ok(file) = File::open(filename) {
            tracing::debug!(path = filename, "loading mime.types");
            if let Err(err) = read_mime_types(map, BufReader::new(file)) {
                tracing::debug!(path = filename, error = %err, "skipping unreadable mime.types");
            }
        }
    }

    Ok(())
}

/// Reads `weight:mimetype:glob[:morefields...]` lines, e.g. `50:text/plain:*.txt`.
///
/// Only simple `*.ext` globs are used.
/// See https://specifications.freedesktop.org/shared-mime-info-spec/shared-mime-info-spec-0.21.html
fn read_globs(map: &mut FileNameMap, reader: impl BufRead) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split(':').collect();

        if fields.len() < 3 || fields[0].is_empty() || fields[0].starts_with('#') {
            continue;
        }
        let Some(extension) = fields[2].strip_prefix('*') else {
            continue;
        };
        if extension.len() < 2
            || !extension.starts_with('.')
            || extension.contains(&['?', '*', '['][..])
        {
            continue;
        }

        let _ = map.add_extension_type_if_absent(extension, fields[1]);
    }

    Ok(())
}

/// Reads `mimetype ext1 ext2 ...` lines, e.g. `text/plain txt text`.
fn read_mime_types(map: &mut FileNameMap, reader: impl BufRead) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();

        let Some(mime_type) = fields.next() else {
            continue;
        };
        if mime_type.starts_with('#') {
            continue;
        }

        for ext in fields.take_while(|ext| !ext.starts_with('#')) {
            let extension = if ext.starts_with('.') {
                ext.to_string()
            } else {
                format!(".{}", ext)
            };
            let _ = map.add_extension_type_if_absent(&extension, mime_type);
        }
    }

    Ok(())
}

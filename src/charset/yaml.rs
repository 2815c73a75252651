//! YAML character encoding detection, per YAML 1.2.2 section 5.2.
//!
//! | Byte order mark | First bytes   | Encoding |
//! |-----------------|---------------|----------|
//! | `00 00 FE FF`   | `00 00 00 x`  | UTF-32BE |
//! | `FF FE 00 00`   | `x 00 00 00`  | UTF-32LE |
//! | `FE FF`         | `00 x`        | UTF-16BE |
//! | `FF FE`         | `x 00`        | UTF-16LE |
//! | `EF BB BF`      | anything else | UTF-8    |
//!
//! UTF-8 is YAML's default, so any non-empty stream gets a charset. An empty
//! stream gets none.

use super::CharsetSniffer;
use crate::byte_source::ByteSource;
use crate::media_type::MediaType;
use std::io;

/// YAML media types; the first is the registered one, the rest are aliases
/// seen in the wild.
const YAML_TYPES: &[(&str, &str)] = &[
    ("application", "yaml"),
    ("application", "x-yaml"),
    ("text", "yaml"),
    ("text", "x-yaml"),
];

const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCharsetSniffer;

impl YamlCharsetSniffer {
    /// Reads the encoding off the first (up to four) bytes of a stream.
    pub fn detect(prefix: &[u8]) -> Option<&'static str> {
        let encoding = match prefix {
            [] => return None,
            [0x00, 0x00, 0xFE, 0xFF, ..] | [0x00, 0x00, 0x00, _, ..] => "UTF-32BE",
            [0xFF, 0xFE, 0x00, 0x00, ..] | [_, 0x00, 0x00, 0x00, ..] => "UTF-32LE",
            [0xFE, 0xFF, ..] | [0x00, _, ..] => "UTF-16BE",
            [0xFF, 0xFE, ..] | [_, 0x00, ..] => "UTF-16LE",
            _ => "UTF-8",
        };
        Some(encoding)
    }
}

impl CharsetSniffer for YamlCharsetSniffer {
    fn family(&self) -> &str {
        "yaml"
    }

    fn media_types(&self) -> Vec<MediaType> {
        YAML_TYPES
            .iter()
            .map(|(type_, subtype)| MediaType::new(type_, subtype))
            .collect()
    }

    fn extensions(&self) -> Vec<String> {
        YAML_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    }

    fn sniff(&self, bytes: &dyn ByteSource) -> io::Result<Option<String>> {
        let prefix = bytes.read_prefix(4)?;
        Ok(Self::detect(&prefix).map(str::to_string))
    }
}

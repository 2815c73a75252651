//! Helpers for reading resource addresses.
//!
//! A URI can carry its own media type and charset:
//! - `data:` URIs (RFC 2397) in their header, e.g. `data:text/csv;charset=utf-8,a,b`;
//! - any other URI through the `mediaType` and `charset` query parameters,
//!   e.g. `https://example.org/x?mediaType=application/yaml`.

use crate::media_type::{MediaType, CHARSET};
use std::path::PathBuf;
use url::Url;

/// Query parameter naming the resource's media type.
pub const MEDIA_TYPE_QUERY: &str = "mediaType";

/// Query parameter naming the resource's charset.
pub const CHARSET_QUERY: &str = "charset";

/// Media type of a `data:` URI that does not name one.
const DATA_DEFAULT_TYPE: &str = "text/plain";

/// Charset of a `data:` URI that names neither type nor charset.
const DATA_DEFAULT_CHARSET: &str = "US-ASCII";

/// The media type and charset a URI carries itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriMediaType {
    /// The embedded media type, verbatim; may include parameters.
    pub media_type: Option<String>,
    pub charset: Option<String>,
}

/// Returns the last path segment, or an empty string for URIs without a
/// hierarchical path such as `data:` or `mailto:`.
///
/// # Examples
///
/// ```
/// use tokio_mediatype::uri::file_name;
/// use url::Url;
///
/// let uri = Url::parse("https://example.org/docs/config.yaml?x=1#top").unwrap();
/// assert_eq!(file_name(&uri), "config.yaml");
/// ```
pub fn file_name(uri: &Url) -> String {
    if uri.cannot_be_a_base() {
        return String::new();
    }
    uri.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string()
}

/// The part of the file name after its last dot, without the dot.
/// Empty when there is none.
pub fn file_extension(uri: &Url) -> String {
    let name = file_name(uri);
    match name.rfind('.') {
        Some(dot) => name[dot + 1..].to_string(),
        None => String::new(),
    }
}

/// A copy of `uri` without query and fragment.
pub fn drop_query_and_fragment(uri: &Url) -> Url {
    let mut stripped = uri.clone();
    stripped.set_query(None);
    stripped.set_fragment(None);
    stripped
}

/// Maps a URI onto a local filesystem path.
///
/// `file:` URIs convert directly; other hierarchical URIs are treated as
/// aliases whose path component is a local absolute path.
pub fn to_file_path(uri: &Url) -> Option<PathBuf> {
    let uri = drop_query_and_fragment(uri);
    if uri.scheme() == "file" {
        return uri.to_file_path().ok();
    }
    if uri.cannot_be_a_base() {
        return None;
    }
    let mut file = Url::parse("file:///").ok()?;
    file.set_path(uri.path());
    file.to_file_path().ok()
}

/// Extracts the media type and charset embedded in `uri`.
///
/// # Examples
///
/// ```
/// use tokio_mediatype::uri::media_type_and_charset;
/// use url::Url;
///
/// let uri = Url::parse("data:application/json;charset=utf-16,%7B%7D").unwrap();
/// let embedded = media_type_and_charset(&uri);
/// assert_eq!(embedded.media_type.as_deref(), Some("application/json;charset=utf-16"));
/// assert_eq!(embedded.charset.as_deref(), Some("utf-16"));
/// ```
pub fn media_type_and_charset(uri: &Url) -> UriMediaType {
    if uri.scheme() == "data" {
        return data_media_type(uri);
    }

    let mut embedded = UriMediaType::default();
    for (key, value) in uri.query_pairs() {
        if key == MEDIA_TYPE_QUERY && !value.trim().is_empty() {
            embedded.media_type = Some(value.trim().to_string());
        } else if key == CHARSET_QUERY && !value.trim().is_empty() {
            embedded.charset = Some(value.trim().to_string());
        }
    }
    if embedded.charset.is_none() {
        embedded.charset = embedded
            .media_type
            .as_deref()
            .and_then(|mt| MediaType::parse_lenient(mt).charset().map(str::to_string));
    }
    embedded
}

fn data_media_type(uri: &Url) -> UriMediaType {
    let Some((header, _)) = uri.path().split_once(',') else {
        return UriMediaType::default();
    };
    let header = strip_base64_marker(header).trim();

    let media_type = if header.is_empty() || header.starts_with(';') {
        format!("{}{}", DATA_DEFAULT_TYPE, header)
    } else {
        header.to_string()
    };
    let charset = MediaType::parse_lenient(&media_type)
        .parameter(CHARSET)
        .map(str::to_string)
        .or_else(|| header.is_empty().then(|| DATA_DEFAULT_CHARSET.to_string()));

    UriMediaType {
        media_type: Some(media_type),
        charset,
    }
}

/// Removes a trailing `;base64` from a `data:` header.
pub(crate) fn strip_base64_marker(header: &str) -> &str {
    match header.len().checked_sub(";base64".len()) {
        Some(at) if header.is_char_boundary(at) && header[at..].eq_ignore_ascii_case(";base64") => {
            &header[..at]
        }
        _ => header,
    }
}

/// `%XX` escapes become bytes; malformed escapes are kept literally.
pub(crate) fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or_default();
            if let Ok(b) = u8::from_str_radix(hex, 16) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

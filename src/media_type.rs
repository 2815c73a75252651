//! The media type value: `type/subtype` plus an ordered parameter map.
//!
//! The base type is validated with the [`mime`] grammar. Parameters follow
//! RFC 2045 and RFC 2616, with RFC 2231 extended values, so whatever
//! [`format_media_type`] writes parses back to the same map.
//! [`MediaType::from_str`] is strict, [`MediaType::parse_lenient`] never fails
//! and is what the resolver uses for declared content types coming from
//! upstream.

use crate::error::{Error, Result};
use crate::uri::percent_decode;
use encoding_rs::Encoding;
use mime::Mime;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const UPPER_HEX: &[u8] = b"0123456789ABCDEF";

/// `application/octet-stream`, the type of unknown binary content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// `application/json`
pub const JSON: &str = "application/json";

/// `text/plain`
pub const PLAIN_TEXT: &str = "text/plain";

/// `application/yaml`
pub const YAML: &str = "application/yaml";

/// The canonical name of the charset assigned by family defaults.
pub const UTF_8: &str = "UTF-8";

/// Name of the charset parameter.
pub const CHARSET: &str = "charset";

/// An immutable media type.
///
/// Type, subtype and parameter names are always lower-case. Parameter values
/// are kept as given, so a declared `charset=ISO-8859-1` survives untouched;
/// use [`MediaType::has_charset`] for a case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaType {
    type_: String,
    subtype: String,
    params: BTreeMap<String, String>,
}

impl MediaType {
    /// Creates a media type without parameters. Both parts are lower-cased.
    pub fn new(type_: &str, subtype: &str) -> Self {
        Self {
            type_: type_.trim().to_ascii_lowercase(),
            subtype: subtype.trim().to_ascii_lowercase(),
            params: BTreeMap::new(),
        }
    }

    /// `application/octet-stream`
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Parses `v` on a best-effort basis; this never fails.
    ///
    /// Characters that are not allowed in a token are dropped from type and
    /// subtype. When nothing usable remains, `application/octet-stream` is
    /// returned. Malformed parameters are skipped.
    pub fn parse_lenient(v: &str) -> Self {
        match v.parse::<MediaType>() {
            Ok(media_type) => media_type,
            Err(err) => {
                let (base, rest) = v.split_once(';').unwrap_or((v, ""));
                let (major, sub) = base.split_once('/').unwrap_or((base, ""));
                let major = sanitize_token(major);
                let sub = sanitize_token(sub);
                if major.is_empty() || sub.is_empty() {
                    tracing::warn!(
                        input = v,
                        error = %err,
                        "unusable media type, using {}",
                        OCTET_STREAM
                    );
                    return Self::octet_stream();
                }
                let repaired = Self {
                    type_: major,
                    subtype: sub,
                    params: parse_parameters(rest),
                };
                tracing::warn!(
                    input = v,
                    error = %err,
                    repaired = %repaired,
                    "repaired malformed media type"
                );
                repaired
            }
        }
    }

    /// The top-level type, e.g. `text`.
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// The subtype, e.g. `ld+json`.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The value of the `charset` parameter.
    pub fn charset(&self) -> Option<&str> {
        self.parameter(CHARSET)
    }

    /// Compares the charset to `name`, ignoring ASCII case.
    pub fn has_charset(&self, name: &str) -> bool {
        self.charset()
            .map_or(false, |charset| charset.eq_ignore_ascii_case(name))
    }

    /// Returns a copy with `name` set to `value`, replacing any previous value.
    pub fn with_parameter(&self, name: &str, value: &str) -> Self {
        let mut params = self.params.clone();
        params.insert(name.to_ascii_lowercase(), value.trim().to_string());
        Self {
            type_: self.type_.clone(),
            subtype: self.subtype.clone(),
            params,
        }
    }

    /// Returns a copy whose charset is `charset`.
    pub fn with_charset(&self, charset: &str) -> Self {
        self.with_parameter(CHARSET, charset)
    }

    pub fn without_parameters(&self) -> Self {
        Self::new(&self.type_, &self.subtype)
    }

    /// Whether this type falls within `range`.
    ///
    /// `*` in the range matches any type or subtype, and every parameter of
    /// the range must be present here with the same value. `text/*` matches
    /// `text/html; charset=utf-8`, but `text/html; charset=utf-8` does not
    /// match `text/html`.
    pub fn is(&self, range: &MediaType) -> bool {
        (range.type_ == "*" || range.type_ == self.type_)
            && (range.subtype == "*" || range.subtype == self.subtype)
            && range
                .params
                .iter()
                .all(|(name, value)| self.params.get(name) == Some(value))
    }

    /// The same value as a [`mime::Mime`], for APIs built on that crate.
    ///
    /// `None` when `mime` rejects the formatted value.
    pub fn to_mime(&self) -> Option<Mime> {
        self.to_string().parse().ok()
    }

    /// Equality ignoring parameters.
    pub fn essence_eq(&self, other: &MediaType) -> bool {
        self.type_ == other.type_ && self.subtype == other.subtype
    }

    /// Whether the subtype carries the structured syntax suffix `+suffix`.
    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.subtype
            .rsplit_once('+')
            .map_or(false, |(_, s)| s.eq_ignore_ascii_case(suffix))
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (essence, params) = parse_media_type(s)?;
        let (type_, subtype) = essence
            .split_once('/')
            .ok_or_else(|| Error::MediaType("no media type".to_string()))?;
        Ok(Self {
            type_: type_.to_string(),
            subtype: subtype.to_string(),
            params,
        })
    }
}

impl From<&Mime> for MediaType {
    fn from(mime: &Mime) -> Self {
        Self::parse_lenient(mime.as_ref())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_media_type(&self.essence(), &self.params))
    }
}

/// Parses a media type value and any optional parameters, per RFC 1521.
///
/// Returns the lower-cased `type/subtype` and the parameters. Quoted values
/// are unescaped and RFC 2231 extended values (`name*=charset'lang'%XX`,
/// including `name*0*` continuations) are decoded into plain `name` entries.
///
/// # Examples
///
/// ```
/// use tokio_mediatype::parse_media_type;
///
/// let (media_type, params) = parse_media_type("text/html; charset=utf-8").unwrap();
/// assert_eq!(media_type, "text/html");
/// assert_eq!(params.get("charset"), Some(&"utf-8".to_string()));
///
/// let (_, params) = parse_media_type("text/plain; title*=utf-8''caf%C3%A9").unwrap();
/// assert_eq!(params.get("title"), Some(&"caf\u{e9}".to_string()));
/// ```
pub fn parse_media_type(v: &str) -> Result<(String, BTreeMap<String, String>)> {
    let (base, rest) = v.split_once(';').unwrap_or((v, ""));
    Ok((parse_essence(base)?, parse_parameters(rest)))
}

/// Validates `type/subtype` with the `mime` grammar.
fn parse_essence(base: &str) -> Result<String> {
    let base = base.trim();
    if !base.contains('/') {
        return Err(Error::MediaType("no media type".to_string()));
    }
    let mime: Mime = base
        .parse()
        .map_err(|err: mime::FromStrError| Error::MediaType(err.to_string()))?;
    let essence = mime.essence_str().to_ascii_lowercase();
    match essence.split_once('/') {
        Some((major, sub)) if is_token(major) && is_token(sub) => Ok(essence),
        _ => Err(Error::MediaType("invalid media type format".to_string())),
    }
}

/// Serializes a media type and parameters per RFC 2045 and RFC 2616.
///
/// Parameters come out in name order; values that are not tokens are quoted,
/// values with non-ASCII characters use RFC 2231 encoding.
///
/// # Examples
///
/// ```
/// use tokio_mediatype::format_media_type;
/// use std::collections::BTreeMap;
///
/// let mut params = BTreeMap::new();
/// params.insert("charset".to_string(), "utf-8".to_string());
/// assert_eq!(format_media_type("text/html", &params), "text/html; charset=utf-8");
/// ```
pub fn format_media_type(t: &str, params: &BTreeMap<String, String>) -> String {
    let mut result = match t.split_once('/') {
        Some((major, sub)) if is_token(major) && is_token(sub) => {
            format!("{}/{}", major.to_lowercase(), sub.to_lowercase())
        }
        _ => return String::new(),
    };

    for (key, value) in params {
        if !is_token(key) {
            return String::new();
        }
        result.push_str("; ");
        result.push_str(&key.to_lowercase());

        if value.chars().any(|ch| (ch < ' ' || ch > '~') && ch != '\t') {
            result.push_str("*=utf-8''");
            for &b in value.as_bytes() {
                let c = b as char;
                if !is_token_char(c) || matches!(c, '*' | '\'' | '%') {
                    result.push('%');
                    result.push(UPPER_HEX[(b >> 4) as usize] as char);
                    result.push(UPPER_HEX[(b & 0x0F) as usize] as char);
                } else {
                    result.push(c);
                }
            }
        } else if is_token(value) {
            result.push('=');
            result.push_str(value);
        } else {
            result.push_str("=\"");
            for ch in value.chars() {
                if ch == '"' || ch == '\\' {
                    result.push('\\');
                }
                result.push(ch);
            }
            result.push('"');
        }
    }

    result
}

/// Parses the parameter list following the first `;`.
///
/// Malformed parameters are skipped. An extended value wins over a plain
/// value of the same name.
fn parse_parameters(rest: &str) -> BTreeMap<String, String> {
    let mut plain = BTreeMap::new();
    let mut extended = BTreeMap::new();
    // name => section number => (percent-encoded, raw value)
    let mut sections: BTreeMap<String, BTreeMap<u32, (bool, String)>> = BTreeMap::new();

    for (name, value) in split_parameters(rest) {
        let (name, encoded) = match name.strip_suffix('*') {
            Some(stripped) => (stripped.to_string(), true),
            None => (name, false),
        };
        let section = name.rsplit_once('*').and_then(|(key, n)| {
            let digits = !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit());
            let n = n.parse::<u32>().ok().filter(|_| digits)?;
            Some((key.to_string(), n))
        });

        match section {
            Some((key, n)) => {
                sections.entry(key).or_default().insert(n, (encoded, value));
            }
            None if encoded => {
                if let Some(decoded) = decode_extended(&value) {
                    extended.insert(name, decoded);
                }
            }
            None => {
                plain.insert(name, value);
            }
        }
    }

    for (name, parts) in sections {
        if let Some(value) = join_sections(&parts) {
            extended.insert(name, value);
        }
    }

    plain.extend(extended);
    plain
}

/// Splits `name=value` pairs on `;` outside quoted strings. Names come back
/// lower-cased, quoted values unescaped.
fn split_parameters(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_ascii_whitespace());
        if rest.is_empty() {
            return params;
        }

        let name_end = rest.find(['=', ';']).unwrap_or(rest.len());
        let name = rest[..name_end].trim().to_ascii_lowercase();
        if !rest[name_end..].starts_with('=') {
            rest = &rest[name_end..];
            continue;
        }

        let value_start = rest[name_end + 1..].trim_start();
        let (value, remainder) = match value_start.strip_prefix('"') {
            Some(quoted) => unquote(quoted),
            None => {
                let end = value_start.find(';').unwrap_or(value_start.len());
                (value_start[..end].trim_end().to_string(), &value_start[end..])
            }
        };
        rest = remainder;

        if is_token(&name) {
            params.push((name, value));
        }
    }
}

/// Reads a quoted-string body up to its closing quote, resolving
/// quoted-pairs. Returns the value and the input after the parameter.
fn unquote(s: &str) -> (String, &str) {
    let mut value = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                let after = &s[i + 1..];
                let end = after.find(';').unwrap_or(after.len());
                return (value, &after[end..]);
            }
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    value.push(escaped);
                }
            }
            _ => value.push(c),
        }
    }
    // unterminated
    (value, "")
}

/// `charset'language'%XX...`
fn split_extended(value: &str) -> Option<(&str, &str)> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    Some((charset, parts.next()?))
}

fn decode_extended(value: &str) -> Option<String> {
    let (charset, encoded) = split_extended(value)?;
    decode_text(charset, &percent_decode(encoded))
}

/// Joins RFC 2231 continuations `name*0`, `name*1`, ... in order. A gap ends
/// the value; only the first section names the charset.
fn join_sections(parts: &BTreeMap<u32, (bool, String)>) -> Option<String> {
    let mut charset = "";
    let mut bytes = Vec::new();

    for (expected, (&n, (encoded, value))) in (0u32..).zip(parts) {
        if n != expected {
            break;
        }
        match (*encoded, n) {
            (true, 0) => {
                let (cs, raw) = split_extended(value)?;
                charset = cs;
                bytes.extend(percent_decode(raw));
            }
            (true, _) => bytes.extend(percent_decode(value)),
            (false, _) => bytes.extend_from_slice(value.as_bytes()),
        }
    }

    if !parts.contains_key(&0) {
        return None;
    }
    decode_text(charset, &bytes)
}

/// Decodes `bytes` in the named charset; UTF-8 when unnamed.
fn decode_text(charset: &str, bytes: &[u8]) -> Option<String> {
    let encoding = if charset.is_empty() {
        encoding_rs::UTF_8
    } else {
        Encoding::for_label(charset.trim().as_bytes())?
    };
    let (text, malformed) = encoding.decode_without_bom_handling(bytes);
    (!malformed).then(|| text.into_owned())
}

/// `tchar` per RFC 7230.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

fn sanitize_token(s: &str) -> String {
    s.chars()
        .filter(|c| is_token_char(*c))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let mt: MediaType = "Text/HTML".parse().unwrap();
        assert_eq!(mt.type_(), "text");
        assert_eq!(mt.subtype(), "html");
        assert!(mt.parameters().is_empty());
        assert_eq!(mt.charset(), None);
    }

    #[test]
    fn test_parse_with_quoted_charset() {
        let mt: MediaType = "text/html; Charset=\"ISO-8859-1\"".parse().unwrap();
        assert_eq!(mt.charset(), Some("ISO-8859-1"));
        assert!(mt.has_charset("iso-8859-1"));
        assert_eq!(mt.to_string(), "text/html; charset=ISO-8859-1");
    }

    #[test]
    fn test_strict_parse_rejects_garbage() {
        assert!("nonsense".parse::<MediaType>().is_err());
        assert!("text/ht ml".parse::<MediaType>().is_err());
        assert!("/plain".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_parse_lenient_repairs() {
        assert_eq!(MediaType::parse_lenient("text/ht ml").essence(), "text/html");
        assert_eq!(
            MediaType::parse_lenient("application/(json); charset=utf-8").to_string(),
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_parse_lenient_falls_back_to_octet_stream() {
        assert_eq!(MediaType::parse_lenient(""), MediaType::octet_stream());
        assert_eq!(MediaType::parse_lenient("nonsense"), MediaType::octet_stream());
        assert_eq!(MediaType::parse_lenient("text/"), MediaType::octet_stream());
    }

    #[test]
    fn test_with_charset_replaces() {
        let mt = MediaType::parse_lenient("text/plain; charset=us-ascii");
        let mt = mt.with_charset(UTF_8);
        assert_eq!(mt.charset(), Some("UTF-8"));
        assert_eq!(mt.parameters().len(), 1);
    }

    #[test]
    fn test_without_parameters() {
        let mt = MediaType::parse_lenient("text/plain; charset=utf-8; format=flowed");
        assert_eq!(mt.without_parameters(), MediaType::new("text", "plain"));
        assert!(mt.essence_eq(&MediaType::new("TEXT", "Plain")));
        assert_ne!(mt, mt.without_parameters());
    }

    #[test]
    fn test_is_range() {
        let html = MediaType::parse_lenient("text/html; charset=utf-8");
        assert!(html.is(&MediaType::new("text", "*")));
        assert!(html.is(&MediaType::new("*", "*")));
        assert!(html.is(&MediaType::new("text", "html")));
        assert!(!html.is(&MediaType::new("application", "*")));
        assert!(!MediaType::new("text", "html").is(&html));
    }

    #[test]
    fn test_has_suffix() {
        assert!(MediaType::new("application", "ld+json").has_suffix("json"));
        assert!(MediaType::new("image", "svg+xml").has_suffix("xml"));
        assert!(!MediaType::new("application", "json").has_suffix("json"));
    }

    #[test]
    fn test_format_media_type_quoting() {
        let mut params = BTreeMap::new();
        params.insert("name".to_string(), "hello world".to_string());
        assert_eq!(
            format_media_type("text/plain", &params),
            "text/plain; name=\"hello world\""
        );

        let mut params = BTreeMap::new();
        params.insert("title".to_string(), "caf\u{e9}".to_string());
        assert_eq!(
            format_media_type("text/plain", &params),
            "text/plain; title*=utf-8''caf%C3%A9"
        );
    }

    #[test]
    fn test_parse_quoted_pairs() {
        let (_, params) = parse_media_type(r#"text/html; profile="a\"b\\c"; q=1"#).unwrap();
        assert_eq!(params.get("profile").map(String::as_str), Some(r#"a"b\c"#));
        assert_eq!(params.get("q").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_parse_semicolon_inside_quotes() {
        let mt: MediaType = r#"application/ld+json; profile="urn:a;urn:b"; charset=utf-8"#
            .parse()
            .unwrap();
        assert_eq!(mt.parameter("profile"), Some("urn:a;urn:b"));
        assert_eq!(mt.charset(), Some("utf-8"));
    }

    #[test]
    fn test_parse_extended_values() {
        let mt: MediaType = "text/plain; title*=utf-8''caf%C3%A9".parse().unwrap();
        assert_eq!(mt.parameter("title"), Some("caf\u{e9}"));
        assert_eq!(mt.parameter("title*"), None);

        let mt: MediaType = "text/plain; title*=iso-8859-1'fr'caf%E9".parse().unwrap();
        assert_eq!(mt.parameter("title"), Some("caf\u{e9}"));

        // extended wins over plain
        let mt: MediaType = "text/plain; title=cafe; title*=utf-8''caf%C3%A9".parse().unwrap();
        assert_eq!(mt.parameter("title"), Some("caf\u{e9}"));

        let mt: MediaType = "text/plain; title*=utf-8''%FF".parse().unwrap();
        assert_eq!(mt.parameter("title"), None);
    }

    #[test]
    fn test_parse_continuations() {
        let mt: MediaType = "text/plain; title*0*=utf-8''caf%C3; title*1*=%A9; title*2=\" au lait\""
            .parse()
            .unwrap();
        assert_eq!(mt.parameter("title"), Some("caf\u{e9} au lait"));

        // sections must start at zero
        let mt: MediaType = "text/plain; name*1=tail".parse().unwrap();
        assert_eq!(mt.parameter("name"), None);
    }

    #[test]
    fn test_display_reparses_escaped_values() {
        let cases = ["caf\u{e9}", r#"a"b"#, r"back\slash", "x; y=z", "", " spaced "];
        for value in cases {
            let mt = MediaType::new("text", "html").with_parameter("title", value);
            let once: MediaType = mt.to_string().parse().unwrap();
            let twice: MediaType = once.to_string().parse().unwrap();
            assert_eq!(once, mt, "{:?}", value);
            assert_eq!(twice, mt, "{:?}", value);
        }
    }

    #[test]
    fn test_mime_interop() {
        let mt = MediaType::from(&mime::TEXT_PLAIN_UTF_8);
        assert_eq!(mt.essence(), "text/plain");
        assert_eq!(mt.charset(), Some("utf-8"));
        assert_eq!(mt.to_mime(), Some(mime::TEXT_PLAIN_UTF_8));
        assert_eq!(MediaType::from(&mime::IMAGE_SVG).subtype(), "svg+xml");
    }

    #[test]
    fn test_format_rejects_invalid_type() {
        assert_eq!(format_media_type("text", &BTreeMap::new()), "");
        assert_eq!(format_media_type("te xt/plain", &BTreeMap::new()), "");
    }
}

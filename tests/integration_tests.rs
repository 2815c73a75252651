//! Integration tests for tokio_mediatype

use std::fs;
use std::sync::Arc;
use tokio_mediatype::*;
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Same as the reference configuration, minus the host's MIME database.
fn detector() -> MediaTypeDetector {
    MediaTypeDetector::builder()
        .file_name_map(FileNameMap::builtin())
        .build()
}

#[test]
fn test_yaml_file_without_declared_type() {
    let uri = url("file:///data/config.yaml");
    let content: &[u8] = b"name: enola\nversion: 1\n";

    let mt = detector().detect(&uri, &content).unwrap();
    assert_eq!(mt.essence(), "application/yaml");
    // YAML streams without BOM or nulls are UTF-8
    assert_eq!(mt.charset(), Some("UTF-8"));
}

#[test]
fn test_yaml_file_with_empty_content() {
    let mt = detector()
        .detect(&url("file:///data/config.yaml"), &EmptySource)
        .unwrap();
    assert_eq!(mt, MediaType::new("application", "yaml"));
}

#[test]
fn test_yaml_charset_from_bom() {
    let cases: &[(&[u8], &str)] = &[
        (b"\xEF\xBB\xBFa: 1", "UTF-8"),
        (b"\xFE\xFF\x00a", "UTF-16BE"),
        (b"\xFF\xFEa\x00", "UTF-16LE"),
        (b"\x00\x00\xFE\xFF", "UTF-32BE"),
        (b"\xFF\xFE\x00\x00", "UTF-32LE"),
    ];
    let d = detector();
    for (content, expected) in cases {
        let mt = d.detect(&url("https://example.org/conf/app.yaml"), content).unwrap();
        assert_eq!(mt.charset(), Some(*expected), "for {:?}", content);
    }
}

#[test]
fn test_yaml_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    fs::write(&path, b"\xFF\xFEk\x00:\x00").unwrap();

    let uri = Url::from_file_path(&path).unwrap();
    let mt = detector().detect(&uri, &FileSource::new(&path)).unwrap();
    assert_eq!(mt.to_string(), "application/yaml; charset=UTF-16LE");
}

#[test]
fn test_content_unknown_falls_back_to_octet_stream() {
    let mt = detector()
        .resolve(Some("content/unknown"), None, Some(&url("https://example.com/readme")))
        .unwrap();
    assert_eq!(mt.to_string(), "application/octet-stream");
    assert_eq!(mt.charset(), None);
}

#[test]
fn test_ignored_type_never_returned() {
    let d = detector();
    for uri in [
        "https://example.com/readme",
        "https://example.com/index.html",
        "file:///tmp/does-not-exist",
        "data:,hello",
    ] {
        let mt = d.resolve(Some("content/unknown"), None, Some(&url(uri))).unwrap();
        assert!(!mt.essence_eq(&MediaType::new("content", "unknown")), "{}", uri);
    }
    let mt = d.resolve(Some("Content/Unknown; x=y"), None, None).unwrap();
    assert_eq!(mt, MediaType::octet_stream());
}

#[test]
fn test_text_plain_fixed_by_extension() {
    let mt = detector()
        .resolve(Some("text/plain"), None, Some(&url("https://raw.example.com/data.json")))
        .unwrap();
    assert_eq!(mt.to_string(), "application/json; charset=UTF-8");
}

#[test]
fn test_ld_json_defaults_to_utf8() {
    let mt = detector().resolve(Some("application/ld+json"), None, None).unwrap();
    assert_eq!(mt.charset(), Some("UTF-8"));
}

#[test]
fn test_declared_encoding_always_wins() {
    let d = detector();
    let uris = [
        "https://example.com/a.json",
        "https://example.com/a.txt",
        "data:;charset=utf-8,x",
    ];
    for uri in uris {
        let mt = d
            .resolve(Some("text/plain"), Some("ISO-8859-1"), Some(&url(uri)))
            .unwrap();
        assert_eq!(mt.charset(), Some("ISO-8859-1"), "{}", uri);
    }
}

#[test]
fn test_file_probe_in_reference_chain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan");
    fs::write(&path, b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n").unwrap();

    let uri = Url::from_file_path(&path).unwrap();
    let mt = detector().resolve(None, None, Some(&uri)).unwrap();
    assert_eq!(mt, MediaType::new("application", "pdf"));
}

#[test]
fn test_custom_detector_chain() {
    let by_host = |uri: &Url| -> Result<Option<MediaType>> {
        let schema = uri.host_str() == Some("schema.example.org");
        Ok(schema.then(|| MediaType::new("application", "schema+json")))
    };
    let detectors: Vec<Arc<dyn FromUri>> = vec![
        Arc::new(by_host),
        Arc::new(detector::ExtensionTableDetector::standard()),
    ];
    let d = MediaTypeDetector::builder().detectors(detectors).build();

    let mt = d.resolve(None, None, Some(&url("https://schema.example.org/person"))).unwrap();
    assert_eq!(mt.to_string(), "application/schema+json; charset=UTF-8");

    let mt = d.resolve(None, None, Some(&url("https://example.org/g.ttl"))).unwrap();
    assert_eq!(mt.to_string(), "text/turtle; charset=UTF-8");
}

#[test]
fn test_overwrite_from_data_uri() {
    let original = MediaType::new("application", "octet-stream");
    let mt = detector()
        .overwrite(&url("data:application/yaml;charset=UTF-16LE,a"), &original)
        .unwrap();
    assert_eq!(mt.to_string(), "application/yaml; charset=UTF-16LE");
}

#[test]
fn test_detect_data_uri_with_payload() {
    let uri = url("data:application/yaml;base64,//5rADoA");
    let source = DataUriSource::new(&uri).unwrap();
    let mt = detector().detect(&uri, &source).unwrap();
    assert_eq!(mt.to_string(), "application/yaml; charset=UTF-16LE");
}

#[test]
fn test_parameters_survive_second_resolution() {
    let d = detector();
    let declared = [
        "text/html; title=caf\u{e9}",
        r#"text/html; profile="a\"b""#,
        r#"application/ld+json; profile="urn:a;urn:b\\c""#,
    ];
    for declared in declared {
        let first = d.resolve(Some(declared), None, None).unwrap();
        let second = d.resolve(Some(&first.to_string()), None, None).unwrap();
        assert_eq!(first, second, "{}", declared);
    }

    let mt = d.resolve(Some("text/html; title=caf\u{e9}"), None, None).unwrap();
    assert_eq!(mt.parameter("title"), Some("caf\u{e9}"));
    let mt = d.resolve(Some(r#"text/html; profile="a\"b""#), None, None).unwrap();
    assert_eq!(mt.parameter("profile"), Some(r#"a"b"#));
}

#[tokio::test]
async fn test_async_detect() {
    let detector = Arc::new(detector());
    let uri = url("https://example.com/charts/values.yaml");
    let mt = task::detect_async(detector, uri, bytes::Bytes::from_static(b"replicas: 3"))
        .await
        .unwrap();
    assert_eq!(mt.to_string(), "application/yaml; charset=UTF-8");
}

mod idempotence {
    use super::*;
    use proptest::prelude::*;

    fn base_types() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("text/plain".to_string()),
            Just("content/unknown".to_string()),
            Just("application/ld+json".to_string()),
            Just("text/html; charset=Shift_JIS".to_string()),
            Just("image/png".to_string()),
            Just("application/yaml".to_string()),
            "[a-z]{1,6}/[a-z+]{1,8}",
        ]
    }

    fn declared_types() -> impl Strategy<Value = Option<String>> {
        let titled = (base_types(), "[ -~\t\u{e9}\u{263a}\u{4e16}]{0,12}").prop_map(
            |(base, title)| {
                MediaType::parse_lenient(&base)
                    .with_parameter("title", &title)
                    .to_string()
            },
        );
        prop::option::of(prop_oneof![
            base_types(),
            titled,
            Just("text/html; title=caf\u{e9}".to_string()),
            Just(r#"application/ld+json; profile="a\"b\\c""#.to_string()),
            Just(r#"text/plain; title="x; y""#.to_string()),
            Just("text/markdown; title*=utf-8''caf%C3%A9".to_string()),
        ])
    }

    fn uris() -> impl Strategy<Value = Url> {
        prop_oneof![
            Just("https://example.com/readme"),
            Just("https://example.com/data.json"),
            Just("file:///data/config.yaml"),
            Just("https://example.org/g.ttl"),
            Just("https://example.org/page.html"),
        ]
        .prop_map(super::url)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn resolve_is_idempotent(declared in declared_types(), uri in uris()) {
            let d = detector();
            let first = d.resolve(declared.as_deref(), None, Some(&uri)).unwrap();
            let second = d.resolve(Some(&first.to_string()), None, Some(&uri)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;
use tokio_mediatype::{FileNameMap, MediaType, MediaTypeDetector};
use url::Url;

static DETECTOR: Lazy<MediaTypeDetector> = Lazy::new(|| {
    MediaTypeDetector::builder()
        .file_name_map(FileNameMap::builtin())
        .build()
});

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let (declared, uri) = s.split_once('\n').unwrap_or((s, "https://example.com/readme"));
    let Ok(uri) = Url::parse(uri) else {
        return;
    };

    if let Ok(resolved) = DETECTOR.resolve(Some(declared), None, Some(&uri)) {
        assert_ne!(resolved.without_parameters(), MediaType::new("content", "unknown"));
    }
});

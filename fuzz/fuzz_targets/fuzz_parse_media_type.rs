#![no_main]

use libfuzzer_sys::fuzz_target;
use tokio_mediatype::{parse_media_type, MediaType};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_media_type(s);

        let repaired = MediaType::parse_lenient(s);
        assert!(!repaired.type_().is_empty() && !repaired.subtype().is_empty());
    }
});

//! Windows-specific file name map loading.
//!
//! Reads file extension associations from the Windows registry.

use crate::error::Result;
use crate::file_name_map::FileNameMap;
use winreg::enums::*;
use winreg::RegKey;

/// Reads `HKEY_CLASSES_ROOT\.ext` keys and their `Content Type` values.
pub(super) fn load_windows(map: &mut FileNameMap) -> Result<()> {
    let hkcr = RegKey::predef(HKEY_CLASSES_ROOT);

    for name in hkcr.enum_keys().filter_map(|name| name.ok()) {
        if name.len() < 2 || !name.starts_with('.') {
            continue;
        }

        let Ok(key) = hkcr.open_subkey_with_flags(&name, KEY_READ) else {
            continue;
        };
        let Ok(content_type) = key.get_value::<String, _>("Content Type") else {
            continue;
        };

        // Some installers register .js as text/plain
        if name == ".js" && content_type.starts_with("text/plain") {
            continue;
        }

        let _ = map.add_extension_type_if_absent(&name, &content_type);
    }

    Ok(())
}

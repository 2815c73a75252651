//! Platform-specific file name map loading.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

use crate::error::Result;
use crate::file_name_map::FileNameMap;

/// Adds the platform's known extensions to `map` without overriding it.
///
/// On Unix systems, reads from:
/// - /usr/share/mime/globs2 (FreeDesktop Shared MIME-info Database)
/// - /etc/mime.types, /etc/apache2/mime.types, etc.
///
/// On Windows, reads from:
/// - Registry HKEY_CLASSES_ROOT for extension associations
pub(crate) fn load_into(map: &mut FileNameMap) -> Result<()> {
    #[cfg(unix)]
    {
        unix::load_unix(map)
    }

    #[cfg(windows)]
    {
        windows::load_windows(map)
    }
}

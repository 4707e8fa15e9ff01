//! Writers for the bin table and the library stats report.
//!
//! Both outputs are rendered to memory first and then written through a
//! temporary file in the destination directory that is renamed into place,
//! so a failed run never leaves a half-written table behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

pub mod stats;
pub mod table;

/// Write `contents` to `path` by way of a renamed temporary file
///
/// # Errors
///
/// Returns an I/O error if the temporary file cannot be created, written or
/// renamed over `path`.
pub fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

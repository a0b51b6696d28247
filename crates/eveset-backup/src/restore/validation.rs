//! Pre-flight checks and integrity validation for backup archives

use crate::archive::{open_archive, verify_entries};
use crate::error::{BackupError, Result};
use std::path::Path;
use tracing::debug;

/// The archive must exist as a regular file
pub fn ensure_archive_exists(archive_path: &Path) -> Result<()> {
    if !archive_path.is_file() {
        return Err(BackupError::NotFound);
    }
    Ok(())
}

/// Open `archive_path`, decompress every entry, and return the file count.
///
/// An archive without any file entries is rejected as empty.
pub fn try_validate_backup_integrity(archive_path: &Path) -> Result<usize> {
    ensure_archive_exists(archive_path)?;

    let mut zip = open_archive(archive_path, "reading backup")?;
    if zip.len() == 0 {
        return Err(BackupError::Empty);
    }

    let files = verify_entries(&mut zip)?;
    if files == 0 {
        return Err(BackupError::Empty);
    }

    debug!("{} passed integrity check ({} files)", archive_path.display(), files);
    Ok(files)
}

/// Reporting form of [`try_validate_backup_integrity`]
pub fn validate_backup_integrity(archive_path: &Path) -> (bool, String) {
    match try_validate_backup_integrity(archive_path) {
        Ok(files) => (true, format!("Backup is valid ({} files)", files)),
        Err(err) => (false, err.detailed()),
    }
}

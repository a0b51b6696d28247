//! Restore system
//!
//! An archive is restored either into a fresh `settings_restored_<timestamp>`
//! folder under the base path, or over an existing profile folder through a
//! [`RestoreTransaction`]. In both cases the archive's profile folder is
//! dropped so files land directly in the target.

use crate::archive::{common_root, count_file_entries, extract_archive, open_archive};
use crate::error::{BackupError, Result};
use crate::manager::{BackupManager, OperationOutcome};
use crate::naming::restored_dir_name;
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod transaction;
pub mod validation;

pub use transaction::RestoreTransaction;
pub use validation::{ensure_archive_exists, try_validate_backup_integrity, validate_backup_integrity};

/// Where an archive was restored and how many files were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredBackup {
    pub target: PathBuf,
    pub file_count: usize,
}

impl RestoredBackup {
    pub fn summary(&self) -> String {
        let dir_name = self
            .target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.target.display().to_string());
        format!("Restored {} files to {}", self.file_count, dir_name)
    }
}

impl BackupManager {
    /// Restore `archive_path`.
    ///
    /// With `restore_to` the folder is replaced; otherwise a new folder is
    /// created under the base path.
    pub fn try_restore(
        &self,
        archive_path: &Path,
        restore_to: Option<&Path>,
    ) -> Result<RestoredBackup> {
        ensure_archive_exists(archive_path)?;
        let base = self.require_base()?;

        let mut zip = open_archive(archive_path, "restoring backup")?;
        if count_file_entries(&zip) == 0 {
            return Err(BackupError::Empty);
        }
        let root = common_root(&zip);

        match restore_to {
            Some(target) => {
                info!(
                    "Restoring {} over {}",
                    archive_path.display(),
                    target.display()
                );
                let transaction = RestoreTransaction::begin(target)?;
                let file_count =
                    extract_archive(&mut zip, transaction.staging_dir(), root.as_deref())?;
                let target = transaction.commit()?;
                Ok(RestoredBackup { target, file_count })
            }
            None => {
                let target = base.join(restored_dir_name(Local::now().naive_local()));
                if target.exists() {
                    return Err(BackupError::io(
                        "restoring backup",
                        io::Error::new(
                            io::ErrorKind::AlreadyExists,
                            format!("{} already exists", target.display()),
                        ),
                    ));
                }
                info!(
                    "Restoring {} into {}",
                    archive_path.display(),
                    target.display()
                );

                fs::create_dir_all(&target).map_err(|e| BackupError::io("restoring backup", e))?;
                match extract_archive(&mut zip, &target, root.as_deref()) {
                    Ok(file_count) => Ok(RestoredBackup { target, file_count }),
                    Err(err) => {
                        if let Err(e) = fs::remove_dir_all(&target) {
                            warn!("Could not clean up {}: {}", target.display(), e);
                        }
                        Err(err)
                    }
                }
            }
        }
    }

    /// Reporting form of [`BackupManager::try_restore`]
    pub fn restore(&self, archive_path: &Path, restore_to: Option<&Path>) -> OperationOutcome {
        let result = self.try_restore(archive_path, restore_to);
        if let Err(err) = &result {
            warn!("Restore of {} failed: {}", archive_path.display(), err);
        }
        OperationOutcome::from_result(result, |restored| restored.summary())
    }
}

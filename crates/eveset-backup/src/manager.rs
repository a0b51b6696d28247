//! Profile backup creation and backup folder housekeeping.

use crate::archive::{collect_files, write_archive};
use crate::error::{BackupError, Result};
use crate::naming::{format_backup_filename, ARCHIVE_EXTENSION, BACKUP_DIR_NAME};
use chrono::{DateTime, Local};
use eveset_core::utils::format_megabytes;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of [`BackupManager::create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    pub success: bool,
    pub message: String,
    pub archive_path: Option<PathBuf>,
}

/// Result of restore and delete operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
}

impl OperationOutcome {
    pub(crate) fn from_result<T>(result: Result<T>, message: impl FnOnce(T) -> String) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                message: message(value),
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
            },
        }
    }
}

/// A freshly written archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBackup {
    pub archive_path: PathBuf,
    pub file_count: usize,
    pub size_bytes: u64,
}

impl CreatedBackup {
    pub fn summary(&self) -> String {
        format!("{} files ({})", self.file_count, format_megabytes(self.size_bytes))
    }
}

/// An archive found in the backup folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFileInfo {
    pub path: PathBuf,
    pub modified: DateTime<Local>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupStats {
    pub count: usize,
    pub total_size_bytes: u64,
    pub oldest: Option<DateTime<Local>>,
    pub newest: Option<DateTime<Local>>,
}

impl BackupStats {
    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Creates, restores, lists and deletes archives under `<base>/backups`.
///
/// All operations are blocking; async callers should run them on a
/// blocking thread.
#[derive(Debug, Clone, Default)]
pub struct BackupManager {
    base_path: Option<PathBuf>,
}

impl BackupManager {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    /// A manager with no base path; every operation that needs one fails
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn set_base_path(&mut self, base_path: impl Into<PathBuf>) {
        self.base_path = Some(base_path.into());
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub(crate) fn require_base(&self) -> Result<&Path> {
        self.base_path.as_deref().ok_or(BackupError::BasePathNotSet)
    }

    /// `<base>/backups`, without creating it
    pub fn backup_directory(&self) -> Option<PathBuf> {
        self.base_path.as_ref().map(|base| base.join(BACKUP_DIR_NAME))
    }

    fn ensure_backup_directory(&self) -> Result<PathBuf> {
        let dir = self.require_base()?.join(BACKUP_DIR_NAME);
        fs::create_dir_all(&dir).map_err(|e| BackupError::io("creating backup", e))?;
        Ok(dir)
    }

    /// Snapshot `profile_dir` into `<base>/backups/<profile>_<timestamp>.zip`
    pub fn try_create(&self, profile_dir: &Path) -> Result<CreatedBackup> {
        self.require_base()?;

        let profile_name = profile_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| profile_dir.display().to_string());

        if !profile_dir.exists() {
            return Err(BackupError::ProfileNotFound { name: profile_name });
        }
        if !profile_dir.is_dir() {
            return Err(BackupError::NotADirectory { name: profile_name });
        }

        let files = collect_files(profile_dir)?;
        if files.is_empty() {
            return Err(BackupError::NoFiles);
        }

        let backup_dir = self.ensure_backup_directory()?;
        let filename = format_backup_filename(&profile_name, Local::now().naive_local());
        let archive_path = backup_dir.join(filename);

        info!(
            "Backing up {} files from {} to {}",
            files.len(),
            profile_dir.display(),
            archive_path.display()
        );

        if let Err(err) = write_archive(profile_dir, &profile_name, &files, &archive_path) {
            if archive_path.exists() {
                if let Err(e) = fs::remove_file(&archive_path) {
                    warn!("Could not remove partial archive {}: {}", archive_path.display(), e);
                }
            }
            return Err(err);
        }

        let size_bytes = fs::metadata(&archive_path)
            .map_err(|e| BackupError::io("creating backup", e))?
            .len();

        Ok(CreatedBackup {
            archive_path,
            file_count: files.len(),
            size_bytes,
        })
    }

    /// Reporting form of [`BackupManager::try_create`]
    pub fn create(&self, profile_dir: &Path) -> BackupOutcome {
        match self.try_create(profile_dir) {
            Ok(created) => BackupOutcome {
                success: true,
                message: created.summary(),
                archive_path: Some(created.archive_path),
            },
            Err(err) => {
                warn!("Backup of {} failed: {}", profile_dir.display(), err);
                BackupOutcome {
                    success: false,
                    message: err.to_string(),
                    archive_path: None,
                }
            }
        }
    }

    /// Archives directly in the backup folder, newest modification first
    pub fn list_backups(&self) -> Vec<BackupFileInfo> {
        let Some(dir) = self.backup_directory() else {
            return Vec::new();
        };
        let Ok(entries) = fs::read_dir(&dir) else {
            debug!("No backup folder at {}", dir.display());
            return Vec::new();
        };

        let mut backups: Vec<BackupFileInfo> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(ARCHIVE_EXTENSION))
            })
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                Some(BackupFileInfo {
                    path: entry.path(),
                    modified: DateTime::<Local>::from(meta.modified().ok()?),
                    size_bytes: meta.len(),
                })
            })
            .collect();

        backups.sort_by(|a, b| b.modified.cmp(&a.modified));
        backups
    }

    pub fn try_delete_backup(&self, archive_path: &Path) -> Result<String> {
        if !archive_path.exists() {
            return Err(BackupError::NotFound);
        }

        fs::remove_file(archive_path).map_err(|e| BackupError::io("deleting backup", e))?;
        let name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        info!("Deleted backup {}", archive_path.display());
        Ok(name)
    }

    /// Reporting form of [`BackupManager::try_delete_backup`]
    pub fn delete_backup(&self, archive_path: &Path) -> OperationOutcome {
        OperationOutcome::from_result(self.try_delete_backup(archive_path), |name| {
            format!("Deleted backup: {}", name)
        })
    }

    /// Count, total size and age range of the archives in the backup folder
    pub fn backup_stats(&self) -> BackupStats {
        let backups = self.list_backups();

        BackupStats {
            count: backups.len(),
            total_size_bytes: backups.iter().map(|b| b.size_bytes).sum(),
            oldest: backups.last().map(|b| b.modified),
            newest: backups.first().map(|b| b.modified),
        }
    }
}

//! Staged replacement of a restore target.
//!
//! Files are extracted into a hidden sibling folder first. On commit the old
//! target is renamed aside, the staged folder is renamed into its place and
//! only then is the old copy deleted. If the second rename fails the old
//! target is renamed back.

use crate::error::{BackupError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

const STAGING_PREFIX: &str = ".eveset-restore-";
const DISPLACED_PREFIX: &str = ".eveset-old-";

pub struct RestoreTransaction {
    target: PathBuf,
    staging: TempDir,
}

impl RestoreTransaction {
    /// Create the staging folder next to `target`
    pub fn begin(target: &Path) -> Result<Self> {
        let context = "restoring backup";
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| BackupError::io(context, e))?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| BackupError::io(context, e))?;
        debug!("Staging restore in {}", staging.path().display());

        Ok(Self {
            target: target.to_path_buf(),
            staging,
        })
    }

    /// Where extracted files go until commit
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Swap the staged folder in for the target
    pub fn commit(self) -> Result<PathBuf> {
        self.commit_with(|from, to| fs::rename(from, to))
    }

    fn commit_with<F>(self, rename: F) -> Result<PathBuf>
    where
        F: Fn(&Path, &Path) -> io::Result<()>,
    {
        let context = "restoring backup";
        let staged = self.staging.keep();

        let displaced = if self.target.exists() {
            let aside = displaced_path(&staged);
            info!("Replacing {}", self.target.display());
            if let Err(e) = rename(&self.target, &aside) {
                discard(&staged);
                return Err(BackupError::io(context, e));
            }
            Some(aside)
        } else {
            None
        };

        if let Err(e) = rename(&staged, &self.target) {
            match &displaced {
                Some(aside) => match rename(aside, &self.target) {
                    Ok(()) => discard(&staged),
                    Err(rollback) => warn!(
                        "Could not move {} back to {}: {}; restored files remain in {}",
                        aside.display(),
                        self.target.display(),
                        rollback,
                        staged.display()
                    ),
                },
                None => discard(&staged),
            }
            return Err(BackupError::io(context, e));
        }

        if let Some(aside) = displaced {
            discard(&aside);
        }
        Ok(self.target)
    }
}

/// Sibling of the staging folder that holds the old target during the swap
fn displaced_path(staged: &Path) -> PathBuf {
    let suffix = staged
        .file_name()
        .map(|name| name.to_string_lossy().replace(STAGING_PREFIX, ""))
        .unwrap_or_default();
    staged.with_file_name(format!("{}{}", DISPLACED_PREFIX, suffix))
}

fn discard(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir) {
        warn!("Failed to remove {}: {}", dir.display(), e);
    }
}

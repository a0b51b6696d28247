//! Backup archive file naming
//!
//! Archives are named `<profile>_<YYYYMMDD>_<HHMMSS>.zip`. The profile name is
//! everything before the last two underscore-separated parts, so it may
//! itself contain underscores.

use chrono::NaiveDateTime;

/// Folder, next to the profiles, that holds the archives
pub const BACKUP_DIR_NAME: &str = "backups";

pub const ARCHIVE_EXTENSION: &str = ".zip";

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Prefix of the folder created by a restore that does not overwrite
pub const RESTORED_DIR_PREFIX: &str = "settings_restored";

/// Profile name and creation time recovered from an archive file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub profile_name: String,
    pub created_at: NaiveDateTime,
}

pub fn format_backup_filename(profile_name: &str, created_at: NaiveDateTime) -> String {
    format!(
        "{}_{}{}",
        profile_name,
        created_at.format(TIMESTAMP_FORMAT),
        ARCHIVE_EXTENSION
    )
}

/// Inverse of [`format_backup_filename`]; `None` for any other shape.
pub fn parse_backup_filename(filename: &str) -> Option<BackupName> {
    let stem = filename.strip_suffix(ARCHIVE_EXTENSION)?;

    let mut parts = stem.rsplitn(3, '_');
    let time = parts.next()?;
    let date = parts.next()?;
    let profile_name = parts.next()?;

    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if profile_name.is_empty() || !all_digits(date, 8) || !all_digits(time, 6) {
        return None;
    }

    let created_at =
        NaiveDateTime::parse_from_str(&format!("{}_{}", date, time), TIMESTAMP_FORMAT).ok()?;

    Some(BackupName {
        profile_name: profile_name.to_string(),
        created_at,
    })
}

/// Folder name for a non-overwriting restore started at `now`
pub fn restored_dir_name(now: NaiveDateTime) -> String {
    format!("{}_{}", RESTORED_DIR_PREFIX, now.format(TIMESTAMP_FORMAT))
}

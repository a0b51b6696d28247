//! Per-archive metadata records for listing backups across installations

use crate::archive::{count_file_entries, open_archive};
use crate::discovery::{BackupDirectory, UNKNOWN_SERVER};
use crate::naming::{parse_backup_filename, ARCHIVE_EXTENSION};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Profile name used when the file name does not follow the backup convention
pub const UNKNOWN_PROFILE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupMetadata {
    pub path: PathBuf,
    pub filename: String,
    pub profile_name: String,
    pub created_at: Option<NaiveDateTime>,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub file_count: usize,
    /// The archive could be opened
    pub is_valid: bool,
    pub server_name: String,
    pub installation_path: Option<PathBuf>,
    pub backup_dir: PathBuf,
}

/// Build the record for one archive.
///
/// Never fails: an unparsable name leaves the profile "Unknown" and an
/// unreadable archive is reported with `is_valid == false`.
pub fn get_backup_metadata(
    archive_path: &Path,
    directory: Option<&BackupDirectory>,
) -> BackupMetadata {
    let filename = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let (profile_name, created_at) = match parse_backup_filename(&filename) {
        Some(parsed) => (parsed.profile_name, Some(parsed.created_at)),
        None => {
            debug!("{} does not follow the backup naming convention", filename);
            (UNKNOWN_PROFILE.to_string(), None)
        }
    };

    let size_bytes = fs::metadata(archive_path).map(|m| m.len()).unwrap_or(0);

    let (file_count, is_valid) = match open_archive(archive_path, "reading backup") {
        Ok(zip) => (count_file_entries(&zip), true),
        Err(err) => {
            warn!("Cannot read {}: {}", archive_path.display(), err);
            (0, false)
        }
    };

    let backup_dir = directory
        .map(|d| d.backup_dir.clone())
        .or_else(|| archive_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    BackupMetadata {
        path: archive_path.to_path_buf(),
        filename,
        profile_name,
        created_at,
        size_bytes,
        size_mb: size_bytes as f64 / (1024.0 * 1024.0),
        file_count,
        is_valid,
        server_name: directory
            .map(|d| d.server_name.clone())
            .unwrap_or_else(|| UNKNOWN_SERVER.to_string()),
        installation_path: directory.map(|d| d.installation_path.clone()),
        backup_dir,
    }
}

/// Archives directly inside each discovered folder, newest embedded time first.
///
/// Records without a time sort last; equal keys keep discovery order.
pub fn list_all_backups_from_directories(directories: &[BackupDirectory]) -> Vec<BackupMetadata> {
    let mut records = Vec::new();

    for directory in directories {
        let entries = match fs::read_dir(&directory.backup_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Cannot list {}: {}", directory.backup_dir.display(), err);
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(ARCHIVE_EXTENSION))
            })
            .collect();
        paths.sort();

        records.extend(paths.iter().map(|p| get_backup_metadata(p, Some(directory))));
    }

    records.sort_by(|a, b| match (&a.created_at, &b.created_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{collect_files, write_archive};
    use eveset_core::types::BackupConfig;
    use tempfile::TempDir;

    fn make_archive(profile_parent: &Path, dest: &Path) {
        let profile = profile_parent.join("settings_Default");
        fs::create_dir_all(&profile).unwrap();
        fs::write(profile.join("core_user_1234567.dat"), b"u").unwrap();
        fs::write(profile.join("core_char_7654321.dat"), b"c").unwrap();
        let files = collect_files(&profile).unwrap();
        write_archive(&profile, "settings_Default", &files, dest).unwrap();
    }

    #[test]
    fn test_metadata_for_conventional_name() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("settings_Default_20240115_143022.zip");
        make_archive(temp.path(), &archive);

        let meta = get_backup_metadata(&archive, None);
        assert_eq!(meta.profile_name, "settings_Default");
        assert_eq!(
            meta.created_at.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-15 14:30:22"
        );
        assert_eq!(meta.file_count, 2);
        assert!(meta.is_valid);
        assert!(meta.size_bytes > 0);
        assert_eq!(meta.server_name, UNKNOWN_SERVER);
        assert_eq!(meta.backup_dir, temp.path());
    }

    #[test]
    fn test_metadata_for_odd_name_still_has_size() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("manual copy.zip");
        make_archive(temp.path(), &archive);

        let meta = get_backup_metadata(&archive, None);
        assert_eq!(meta.profile_name, UNKNOWN_PROFILE);
        assert!(meta.created_at.is_none());
        assert_eq!(meta.file_count, 2);
        assert!(meta.size_bytes > 0);
    }

    #[test]
    fn test_unreadable_archive_is_invalid() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("settings_Default_20240115_143022.zip");
        fs::write(&archive, b"junk").unwrap();

        let meta = get_backup_metadata(&archive, None);
        assert!(!meta.is_valid);
        assert_eq!(meta.file_count, 0);
        assert_eq!(meta.size_bytes, 4);
    }

    #[test]
    fn test_listing_sorts_newest_first_with_undated_last() {
        let temp = TempDir::new().unwrap();
        let backups = temp.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        for name in [
            "odd.zip",
            "settings_A_20230101_000000.zip",
            "settings_B_20240601_120000.zip",
        ] {
            make_archive(temp.path(), &backups.join(name));
        }
        fs::write(backups.join("notes.txt"), b"ignored").unwrap();

        let directory = BackupDirectory::from_backup_dir(&backups, &BackupConfig::default());
        let records = list_all_backups_from_directories(&[directory]);

        let names: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "settings_B_20240601_120000.zip",
                "settings_A_20230101_000000.zip",
                "odd.zip"
            ]
        );
        assert!(records.iter().all(|r| r.installation_path.is_some()));
    }
}

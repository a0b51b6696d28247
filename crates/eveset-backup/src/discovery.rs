//! Locating `backups` folders below EVE installation roots

use crate::naming::BACKUP_DIR_NAME;
use eveset_core::types::BackupConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Label used when no known server fragment matches a path
pub const UNKNOWN_SERVER: &str = "Unknown";

/// A discovered backup folder and where it sits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupDirectory {
    pub backup_dir: PathBuf,
    pub installation_path: PathBuf,
    pub server_name: String,
    /// Folder holding the backup folder and its sibling profile folders
    pub parent_dir: PathBuf,
}

impl BackupDirectory {
    pub fn from_backup_dir(backup_dir: &Path, config: &BackupConfig) -> Self {
        let parent_dir = backup_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| backup_dir.to_path_buf());

        Self {
            backup_dir: backup_dir.to_path_buf(),
            installation_path: installation_path_for(backup_dir, &config.install_prefix),
            server_name: server_name_for(backup_dir, config),
            parent_dir,
        }
    }
}

/// Server label for `path`: components are checked from the nearest outward,
/// and within a component the configured aliases in order.
pub fn server_name_for(path: &Path, config: &BackupConfig) -> String {
    let components: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_lowercase()),
            _ => None,
        })
        .collect();

    components
        .iter()
        .rev()
        .find_map(|component| {
            config
                .servers
                .iter()
                .find(|alias| component.contains(&alias.fragment.to_lowercase()))
        })
        .map(|alias| alias.label.clone())
        .unwrap_or_else(|| UNKNOWN_SERVER.to_string())
}

/// Nearest ancestor whose name starts with `prefix`, else the backup folder's parent
pub fn installation_path_for(backup_dir: &Path, prefix: &str) -> PathBuf {
    let prefix = prefix.to_lowercase();
    backup_dir
        .ancestors()
        .skip(1)
        .find(|ancestor| {
            ancestor
                .file_name()
                .is_some_and(|name| name.to_string_lossy().to_lowercase().starts_with(&prefix))
        })
        .or_else(|| backup_dir.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| backup_dir.to_path_buf())
}

/// Every folder named `backups` below `search_roots`.
///
/// Missing roots are skipped. A folder reached from two roots is reported once.
pub fn discover_all_backup_directories(
    search_roots: &[PathBuf],
    config: &BackupConfig,
) -> Vec<BackupDirectory> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for root in search_roots {
        if !root.is_dir() {
            debug!("Skipping missing search root {}", root.display());
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(config.discovery_max_depth)
            .sort_by_file_name();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_dir() || entry.file_name() != BACKUP_DIR_NAME {
                continue;
            }

            let key = fs::canonicalize(entry.path()).unwrap_or_else(|_| entry.path().to_path_buf());
            if !seen.insert(key) {
                continue;
            }

            let directory = BackupDirectory::from_backup_dir(entry.path(), config);
            debug!(
                "Found {} ({})",
                directory.backup_dir.display(),
                directory.server_name
            );
            found.push(directory);
        }
    }

    info!("Discovered {} backup folders", found.len());
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_server_name_nearest_component_wins() {
        let config = BackupConfig::default();
        let path = Path::new(
            "/home/u/tranquility/c_ccp_eve_sisi_singularity/settings_Default/../backups",
        );
        assert_eq!(server_name_for(path, &config), "Singularity");

        let path = Path::new("/eve/c_ccp_eve_tq_tranquility/backups");
        assert_eq!(server_name_for(path, &config), "Tranquility");
    }

    #[test]
    fn test_server_name_defaults_to_unknown() {
        let config = BackupConfig::default();
        assert_eq!(
            server_name_for(Path::new("/data/eve/backups"), &config),
            UNKNOWN_SERVER
        );
    }

    #[test]
    fn test_installation_path() {
        let dir = Path::new("/eve/c_ccp_eve_tq_tranquility/settings/backups");
        assert_eq!(
            installation_path_for(dir, "c_ccp_eve_"),
            PathBuf::from("/eve/c_ccp_eve_tq_tranquility")
        );

        let dir = Path::new("/data/profiles/backups");
        assert_eq!(
            installation_path_for(dir, "c_ccp_eve_"),
            PathBuf::from("/data/profiles")
        );
    }

    #[test]
    fn test_discover_skips_missing_roots_and_duplicates() {
        let temp = TempDir::new().unwrap();
        let install = temp.path().join("c_ccp_eve_tq_tranquility");
        let backups = install.join("backups");
        fs::create_dir_all(&backups).unwrap();
        fs::create_dir_all(install.join("settings_Default")).unwrap();

        let roots = vec![
            temp.path().join("missing"),
            temp.path().to_path_buf(),
            install.clone(),
        ];
        let found = discover_all_backup_directories(&roots, &BackupConfig::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].backup_dir, backups);
        assert_eq!(found[0].installation_path, install);
        assert_eq!(found[0].parent_dir, install);
        assert_eq!(found[0].server_name, "Tranquility");
    }

    #[test]
    fn test_discover_honours_max_depth() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b/c/backups")).unwrap();

        let config = BackupConfig {
            discovery_max_depth: 2,
            ..BackupConfig::default()
        };
        assert!(discover_all_backup_directories(&[temp.path().to_path_buf()], &config).is_empty());

        let config = BackupConfig::default();
        assert_eq!(
            discover_all_backup_directories(&[temp.path().to_path_buf()], &config).len(),
            1
        );
    }
}

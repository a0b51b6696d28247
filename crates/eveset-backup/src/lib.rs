//! EVE settings profile backups
//!
//! Profile folders are snapshotted into `<profile>_<YYYYMMDD>_<HHMMSS>.zip`
//! archives inside a `backups` folder next to the profiles. Archives can be
//! restored into a fresh folder or over an existing profile, discovered across
//! installations, inspected, verified, filtered and deleted.
//!
//! # Examples
//!
//! ```no_run
//! use eveset_backup::BackupManager;
//! use std::path::Path;
//!
//! let manager = BackupManager::new("/eve/c_ccp_eve_tq_tranquility");
//! let outcome = manager.create(Path::new("/eve/c_ccp_eve_tq_tranquility/settings_Default"));
//! println!("{}", outcome.message);
//! ```

pub mod archive;
pub mod discovery;
pub mod error;
pub mod filters;
pub mod manager;
pub mod metadata;
pub mod naming;
pub mod restore;

pub use discovery::{discover_all_backup_directories, server_name_for, BackupDirectory};
pub use error::{BackupError, Result};
pub use filters::{
    filter_backups, filter_options, group_backups_by_profile, overwrite_target, BackupFilter,
    FilterOptions, ALL_CHOICE,
};
pub use manager::{
    BackupFileInfo, BackupManager, BackupOutcome, BackupStats, CreatedBackup, OperationOutcome,
};
pub use metadata::{get_backup_metadata, list_all_backups_from_directories, BackupMetadata};
pub use naming::{format_backup_filename, parse_backup_filename, BackupName};
pub use restore::{
    try_validate_backup_integrity, validate_backup_integrity, RestoreTransaction, RestoredBackup,
};

//! In-memory filtering and grouping of backup metadata records.

use crate::metadata::{BackupMetadata, UNKNOWN_PROFILE};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Choice value meaning "do not filter on this field"
pub const ALL_CHOICE: &str = "All";

/// Criteria for [`filter_backups`]; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupFilter {
    pub server: Option<String>,
    pub profile: Option<String>,
    pub installation: Option<PathBuf>,
}

impl BackupFilter {
    /// Build a filter from user choices where [`ALL_CHOICE`] or an empty value disables a field
    pub fn from_choices(server: &str, profile: &str, installation: &str) -> Self {
        let choice = |value: &str| {
            let value = value.trim();
            (!value.is_empty() && value != ALL_CHOICE).then(|| value.to_string())
        };

        Self {
            server: choice(server),
            profile: choice(profile),
            installation: choice(installation).map(PathBuf::from),
        }
    }

    pub fn matches(&self, record: &BackupMetadata) -> bool {
        self.server
            .as_deref()
            .is_none_or(|server| record.server_name == server)
            && self
                .profile
                .as_deref()
                .is_none_or(|profile| record.profile_name == profile)
            && self
                .installation
                .as_ref()
                .is_none_or(|inst| record.installation_path.as_ref() == Some(inst))
    }
}

/// Records matching `filter`, in their original order
pub fn filter_backups(records: &[BackupMetadata], filter: &BackupFilter) -> Vec<BackupMetadata> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

/// Records keyed by profile name; each group keeps input order
pub fn group_backups_by_profile(
    records: &[BackupMetadata],
) -> BTreeMap<String, Vec<BackupMetadata>> {
    let mut groups: BTreeMap<String, Vec<BackupMetadata>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.profile_name.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Distinct values available for each filter field, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub installations: Vec<PathBuf>,
    pub servers: Vec<String>,
    pub profiles: Vec<String>,
}

pub fn filter_options(records: &[BackupMetadata]) -> FilterOptions {
    let installations: BTreeSet<PathBuf> = records
        .iter()
        .filter_map(|r| r.installation_path.clone())
        .collect();
    let servers: BTreeSet<String> = records.iter().map(|r| r.server_name.clone()).collect();
    let profiles: BTreeSet<String> = records.iter().map(|r| r.profile_name.clone()).collect();

    FilterOptions {
        installations: installations.into_iter().collect(),
        servers: servers.into_iter().collect(),
        profiles: profiles.into_iter().collect(),
    }
}

/// Profile folder an overwrite restore of `record` should replace.
///
/// `None` when the archive's profile is unknown.
pub fn overwrite_target(record: &BackupMetadata) -> Option<PathBuf> {
    if record.profile_name == UNKNOWN_PROFILE {
        return None;
    }
    let parent = record.backup_dir.parent()?;
    Some(parent.join(&record.profile_name))
}

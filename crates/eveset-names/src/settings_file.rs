//! Character and account settings files inside a profile folder

use crate::cache::CharacterId;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CHAR_PREFIX: &str = "core_char_";
pub const USER_PREFIX: &str = "core_user_";

/// Smallest id treated as a real character or account
pub const MIN_VALID_ID: CharacterId = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKind {
    Character,
    Account,
}

impl SettingsKind {
    /// Classify a file name. Template files (`core_char__*`, `core_user__*`) are not matched.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let matches = |prefix: &str| {
            name.strip_prefix(prefix)
                .is_some_and(|rest| !rest.starts_with('_'))
        };

        if matches(CHAR_PREFIX) {
            Some(SettingsKind::Character)
        } else if matches(USER_PREFIX) {
            Some(SettingsKind::Account)
        } else {
            None
        }
    }
}

/// A `core_char_*` or `core_user_*` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    pub path: PathBuf,
    pub kind: SettingsKind,
    /// Zero when the name holds no plausible id
    pub id: CharacterId,
}

impl SettingsFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_str()?;
        let kind = SettingsKind::from_file_name(name)?;
        let id = extract_id(name);
        Some(Self { path, kind, id })
    }

    pub fn has_valid_id(&self) -> bool {
        self.id != 0
    }
}

/// All digits of `name` read as one number; 0 if below [`MIN_VALID_ID`] or too long.
pub fn extract_id(name: &str) -> CharacterId {
    let digits: String = name.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<CharacterId>() {
        Ok(id) if id >= MIN_VALID_ID => id,
        _ => 0,
    }
}

/// Settings files directly inside `dir`, sorted by file name
pub fn scan_profile(dir: &Path) -> io::Result<Vec<SettingsFile>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(file) = SettingsFile::from_path(entry.path()) {
            files.push(file);
        }
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

/// Valid character ids from `files`, first occurrence order, no duplicates
pub fn character_ids(files: &[SettingsFile]) -> Vec<CharacterId> {
    let mut seen = HashSet::new();
    files
        .iter()
        .filter(|f| f.kind == SettingsKind::Character && f.has_valid_id())
        .map(|f| f.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(
            SettingsKind::from_file_name("core_char_2112625428.dat"),
            Some(SettingsKind::Character)
        );
        assert_eq!(
            SettingsKind::from_file_name("core_user_12345678.dat"),
            Some(SettingsKind::Account)
        );
        assert_eq!(SettingsKind::from_file_name("core_char__.dat"), None);
        assert_eq!(SettingsKind::from_file_name("core_user__.dat"), None);
        assert_eq!(SettingsKind::from_file_name("prefs.ini"), None);
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(extract_id("core_char_2112625428.dat"), 2112625428);
        assert_eq!(extract_id("core_char_123.dat"), 0);
        assert_eq!(extract_id("core_char_999999.dat"), 0);
        assert_eq!(extract_id("core_char_1000000.dat"), 1_000_000);
        assert_eq!(extract_id("core_char_.dat"), 0);
        assert_eq!(extract_id("core_char_99999999999999999999999.dat"), 0);
    }

    #[test]
    fn test_scan_profile() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("core_user_12345678.dat"), b"u").unwrap();
        fs::write(dir.join("core_char_2112625428.dat"), b"c").unwrap();
        fs::write(dir.join("core_char__.dat"), b"t").unwrap();
        fs::write(dir.join("core_char_42.dat"), b"x").unwrap();
        fs::write(dir.join("prefs.ini"), b"p").unwrap();
        fs::create_dir(dir.join("core_char_3000000")).unwrap();

        let files = scan_profile(dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "core_char_2112625428.dat",
                "core_char_42.dat",
                "core_user_12345678.dat"
            ]
        );
        assert!(!files[1].has_valid_id());
        assert_eq!(character_ids(&files), vec![2112625428]);
    }

    #[test]
    fn test_character_ids_dedup() {
        let files = vec![
            SettingsFile::from_path("a/core_char_2000001.dat").unwrap(),
            SettingsFile::from_path("b/core_char_2000001.dat").unwrap(),
            SettingsFile::from_path("b/core_user_2000002.dat").unwrap(),
            SettingsFile::from_path("b/core_char_2000003.dat").unwrap(),
        ];
        assert_eq!(character_ids(&files), vec![2000001, 2000003]);
    }
}

//! JSON persistence for [`NameCache`]

use crate::cache::{CharacterId, NameCache};
use crate::error::CacheStoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name used when no explicit cache path is given
pub(crate) const DEFAULT_CACHE_FILE: &str = "character-names.json";

#[derive(Debug, Serialize)]
struct CacheFile {
    characters: BTreeMap<CharacterId, String>,
    invalid_ids: BTreeSet<CharacterId>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredCache {
    Current {
        characters: BTreeMap<String, String>,
        #[serde(default)]
        invalid_ids: Vec<CharacterId>,
    },
    /// Flat `{"<id>": "<name>"}` written by older releases
    Legacy(BTreeMap<String, String>),
}

/// Reads and writes the cache file
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/character-names.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache file; a missing file gives an empty cache.
    pub fn load(&self) -> Result<NameCache, CacheStoreError> {
        let mut cache = NameCache::new();

        if !self.path.exists() {
            debug!("No cache file at {}", self.path.display());
            return Ok(cache);
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| CacheStoreError::io(&self.path, e))?;
        let stored: StoredCache =
            serde_json::from_str(&content).map_err(|e| CacheStoreError::json(&self.path, e))?;

        let (characters, invalid_ids) = match stored {
            StoredCache::Current {
                characters,
                invalid_ids,
            } => (characters, invalid_ids),
            StoredCache::Legacy(characters) => {
                debug!("Reading legacy cache format from {}", self.path.display());
                (characters, Vec::new())
            }
        };

        let names = characters
            .into_iter()
            .filter_map(|(key, name)| match key.parse::<CharacterId>() {
                Ok(id) => Some((id, name)),
                Err(_) => {
                    warn!("Ignoring non-numeric character id '{}' in cache", key);
                    None
                }
            })
            .collect();

        cache.load(names, invalid_ids.into_iter().collect());
        debug!(
            "Loaded {} names and {} invalid ids from {}",
            cache.len(),
            cache.invalid_ids().len(),
            self.path.display()
        );
        Ok(cache)
    }

    /// Write `cache` by replacing the file atomically
    pub fn save(&self, cache: &NameCache) -> Result<(), CacheStoreError> {
        let file = CacheFile {
            characters: cache
                .names()
                .iter()
                .map(|(id, name)| (*id, name.clone()))
                .collect(),
            invalid_ids: cache.invalid_ids().iter().copied().collect(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CacheStoreError::json(&self.path, e))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| CacheStoreError::io(&dir, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| CacheStoreError::io(&dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| CacheStoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| CacheStoreError::io(&self.path, e.error))?;

        info!(
            "Saved {} character names to {}",
            cache.len(),
            self.path.display()
        );
        Ok(())
    }
}

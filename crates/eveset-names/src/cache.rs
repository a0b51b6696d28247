//! In-memory character name cache with bulk resolution

use crate::client::LookupClient;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// EVE character (or account) identifier
pub type CharacterId = u64;

/// Lookups allowed in flight at once unless configured otherwise
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Known character names plus ids confirmed not to exist upstream.
///
/// The cache never talks to disk; callers move data in with [`NameCache::load`]
/// and out with [`NameCache::names`] / [`NameCache::invalid_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCache {
    names: HashMap<CharacterId, String>,
    invalid: HashSet<CharacterId>,
    max_concurrent: usize,
}

impl Default for NameCache {
    fn default() -> Self {
        Self {
            names: HashMap::new(),
            invalid: HashSet::new(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Result of [`NameCache::resolve_bulk`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResolution {
    /// Every valid name the cache now knows, not only the requested ones
    pub names: HashMap<CharacterId, String>,
    pub report: ResolveReport,
}

/// Per-call counters for a bulk resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Distinct ids in the request
    pub requested: usize,
    pub from_cache: usize,
    pub known_invalid: usize,
    /// Names fetched successfully
    pub fetched: usize,
    /// Confirmed nonexistent upstream
    pub not_found: usize,
    /// Lookups that could not complete; these ids are also marked invalid
    pub failed: usize,
}

impl ResolveReport {
    /// Number of ids that needed a lookup
    pub fn dispatched(&self) -> usize {
        self.fetched + self.not_found + self.failed
    }
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requested: {} cached, {} known invalid, {} fetched, {} not found, {} failed",
            self.requested,
            self.from_cache,
            self.known_invalid,
            self.fetched,
            self.not_found,
            self.failed
        )
    }
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on concurrent lookups during [`NameCache::resolve_bulk`]; zero is treated as one
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Replace the whole cache contents
    pub fn load(
        &mut self,
        known_names: HashMap<CharacterId, String>,
        known_invalid: HashSet<CharacterId>,
    ) {
        self.names = known_names;
        self.invalid = known_invalid;
    }

    pub fn lookup(&self, id: CharacterId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn is_invalid(&self, id: CharacterId) -> bool {
        self.invalid.contains(&id)
    }

    /// Store a name for `id`.
    ///
    /// An existing invalid mark for `id` is left in place.
    pub fn record(&mut self, id: CharacterId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn record_invalid(&mut self, id: CharacterId) {
        self.invalid.insert(id);
    }

    pub fn names(&self) -> &HashMap<CharacterId, String> {
        &self.names
    }

    pub fn invalid_ids(&self) -> &HashSet<CharacterId> {
        &self.invalid
    }

    /// Number of known names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.invalid.is_empty()
    }

    /// Forget all names and invalid marks
    pub fn clear(&mut self) {
        self.names.clear();
        self.invalid.clear();
    }

    /// Resolve `ids`, fetching only those neither named nor marked invalid.
    ///
    /// Lookups run concurrently, at most `max_concurrent` at a time, and
    /// their results are merged here as each one completes. A lookup that
    /// fails outright marks its id invalid so later calls skip it.
    pub async fn resolve_bulk<C>(&mut self, client: &C, ids: &[CharacterId]) -> BulkResolution
    where
        C: LookupClient + ?Sized,
    {
        let mut report = ResolveReport::default();
        let mut seen = HashSet::with_capacity(ids.len());
        let mut pending = Vec::new();

        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            report.requested += 1;

            if self.names.contains_key(&id) {
                report.from_cache += 1;
            } else if self.invalid.contains(&id) {
                report.known_invalid += 1;
            } else {
                pending.push(id);
            }
        }

        if pending.is_empty() {
            debug!("All {} character names resolved from cache", report.requested);
            return BulkResolution {
                names: self.names.clone(),
                report,
            };
        }

        info!(
            "Fetching {} character names ({} cached, {} known invalid)",
            pending.len(),
            report.from_cache,
            report.known_invalid
        );

        let semaphore = Semaphore::new(self.max_concurrent);
        let mut lookups = FuturesUnordered::new();

        for id in pending {
            let semaphore = &semaphore;
            lookups.push(async move {
                let _permit = semaphore.acquire().await.ok();
                (id, client.fetch(id).await)
            });
        }

        while let Some((id, outcome)) = lookups.next().await {
            match outcome {
                Ok(Some(name)) => {
                    debug!("Resolved character {} to {}", id, name);
                    self.names.insert(id, name);
                    report.fetched += 1;
                }
                Ok(None) => {
                    debug!("Character {} does not exist", id);
                    self.invalid.insert(id);
                    report.not_found += 1;
                }
                Err(err) => {
                    warn!("{}", err);
                    self.invalid.insert(id);
                    report.failed += 1;
                }
            }
        }

        if report.failed > 0 {
            warn!("Failed to fetch {} character name(s)", report.failed);
        }
        info!("Successfully fetched {} character names", report.fetched);

        BulkResolution {
            names: self.names.clone(),
            report,
        }
    }
}

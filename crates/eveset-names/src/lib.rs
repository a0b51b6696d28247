//! # eveset-names
//!
//! Resolves EVE character ids found in settings files to display names.
//!
//! [`NameCache`] holds known names plus ids confirmed not to exist, and
//! [`NameCache::resolve_bulk`] fetches whatever is missing through a
//! [`LookupClient`] with bounded concurrency. [`CacheStore`] persists the
//! cache between runs.

mod cache;
mod client;
mod error;
mod settings_file;
mod store;

pub use cache::{BulkResolution, CharacterId, NameCache, ResolveReport, DEFAULT_MAX_CONCURRENT};
pub use client::{EsiClient, LookupClient};
pub use error::{CacheStoreError, FetchFailed, LookupError};
pub use settings_file::{
    character_ids, extract_id, scan_profile, SettingsFile, SettingsKind, CHAR_PREFIX,
    MIN_VALID_ID, USER_PREFIX,
};
pub use store::CacheStore;

//! Error types for name lookups and cache persistence

use crate::cache::CharacterId;
use thiserror::Error;

/// A single failed request against the lookup endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("server error: HTTP {status}")]
    ServerError { status: u16 },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("unexpected status: HTTP {status}")]
    UnexpectedStatus { status: u16 },
}

impl LookupError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupError::Timeout | LookupError::Connection(_) | LookupError::ServerError { .. }
        )
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Connection(err.to_string())
        }
    }
}

/// The lookup for `id` could not establish whether the character exists
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("lookup for character {id} failed after {attempts} attempt(s): {source}")]
pub struct FetchFailed {
    pub id: CharacterId,
    pub attempts: u32,
    #[source]
    pub source: LookupError,
}

/// Errors reading or writing the persisted cache file
#[derive(Error, Debug)]
pub enum CacheStoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid cache file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheStoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn json(path: &std::path::Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            source,
        }
    }
}

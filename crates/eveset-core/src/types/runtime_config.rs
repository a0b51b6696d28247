//! Runtime configuration types for operational parameters
//!
//! These types control name lookups against ESI (timeouts, concurrency,
//! retry policies) and how backup folders are discovered on disk.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Retry policy key used by the character name lookup client
pub const LOOKUP_OPERATION: &str = "lookup";

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// ESI (EVE Swagger Interface) client configuration
    #[serde(default)]
    pub esi: EsiConfig,

    /// Retry policy configurations
    #[serde(default)]
    pub retry_policies: RetryPoliciesConfig,

    /// Backup discovery settings
    #[serde(default)]
    pub backup: BackupConfig,
}

impl RuntimeConfig {
    /// Checks values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.esi.base_url).map_err(|e| {
            Error::invalid_config(format!("esi.base-url '{}': {}", self.esi.base_url, e))
        })?;

        if self.esi.max_concurrent == 0 {
            return Err(Error::invalid_config(
                "esi.max-concurrent must be at least 1",
            ));
        }

        if self.retry_policies.policy_for(LOOKUP_OPERATION).max_attempts == 0 {
            return Err(Error::invalid_config(
                "retry-policies lookup max-attempts must be at least 1",
            ));
        }

        Ok(())
    }
}

/// ESI client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EsiConfig {
    /// Base URL of the ESI API, without a trailing slash
    #[serde(default = "default_esi_base_url")]
    pub base_url: String,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_esi_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of lookups in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            base_url: default_esi_base_url(),
            timeout_secs: default_esi_timeout(),
            max_concurrent: default_max_concurrent(),
            user_agent: default_user_agent(),
        }
    }
}

impl EsiConfig {
    /// URL of the public character endpoint for `character_id`
    pub fn character_url(&self, character_id: u64) -> String {
        format!(
            "{}/characters/{}/",
            self.base_url.trim_end_matches('/'),
            character_id
        )
    }
}

fn default_esi_base_url() -> String {
    "https://esi.evetech.net/latest".to_string()
}
fn default_esi_timeout() -> u64 {
    10
}
fn default_max_concurrent() -> usize {
    10
}
fn default_user_agent() -> String {
    format!(
        "eveset/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Retry policies configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPoliciesConfig {
    /// Default retry policy
    #[serde(default)]
    pub default: RetryPolicy,

    /// Per-operation retry policies
    #[serde(default)]
    pub operations: HashMap<String, RetryPolicy>,
}

impl Default for RetryPoliciesConfig {
    fn default() -> Self {
        let mut operations = HashMap::new();

        // Lookups retry immediately; ESI transient errors clear quickly
        operations.insert(
            LOOKUP_OPERATION.to_string(),
            RetryPolicy {
                max_attempts: 3,
                strategy: RetryStrategy::None,
                initial_delay_ms: 0,
                max_delay_ms: 0,
            },
        );

        Self {
            default: RetryPolicy::default(),
            operations,
        }
    }
}

impl RetryPoliciesConfig {
    /// Policy for a named operation, falling back to the default policy
    pub fn policy_for(&self, operation: &str) -> RetryPolicy {
        self.operations
            .get(operation)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Retry policy for an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay strategy between attempts
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            strategy: RetryStrategy::default(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay() -> u64 {
    500
}
fn default_max_delay() -> u64 {
    5000
}

/// Delay strategy between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryStrategy {
    /// Retry immediately
    None,

    /// Fixed delay between retries (default)
    #[default]
    FixedDelay,

    /// Delay grows by `initial-delay-ms` each attempt
    LinearBackoff,
}

/// Backup discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackupConfig {
    /// How deep to descend below each search root looking for `backups` folders
    #[serde(default = "default_discovery_max_depth")]
    pub discovery_max_depth: usize,

    /// Folder name prefix of an EVE installation (e.g. `c_ccp_eve_tq_tranquility`)
    #[serde(default = "default_install_prefix")]
    pub install_prefix: String,

    /// Path fragments identifying each game server, matched case-insensitively
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerAlias>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            discovery_max_depth: default_discovery_max_depth(),
            install_prefix: default_install_prefix(),
            servers: default_servers(),
        }
    }
}

/// Maps a path fragment to a server display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerAlias {
    /// Lowercase fragment searched for in path components
    pub fragment: String,

    /// Label reported for matching paths
    pub label: String,
}

impl ServerAlias {
    pub fn new(fragment: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            label: label.into(),
        }
    }
}

fn default_discovery_max_depth() -> usize {
    8
}
fn default_install_prefix() -> String {
    "c_ccp_eve_".to_string()
}
fn default_servers() -> Vec<ServerAlias> {
    vec![
        ServerAlias::new("tranquility", "Tranquility"),
        ServerAlias::new("singularity", "Singularity"),
        ServerAlias::new("sisi", "Singularity"),
        ServerAlias::new("duality", "Duality"),
        ServerAlias::new("thunderdome", "Thunderdome"),
        ServerAlias::new("serenity", "Serenity"),
    ]
}

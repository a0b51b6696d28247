//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Runtime config (~/.eveset/eveset-runtime.yaml)
//! 3. Environment variables (EVESET_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::{RetryPoliciesConfig, RuntimeConfig, LOOKUP_OPERATION};
use crate::utils::get_home_dir;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::str::FromStr;

/// Name of the user runtime config file inside the config directory
pub const RUNTIME_CONFIG_FILE: &str = "eveset-runtime.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.eveset)
    pub fn new() -> Result<Self> {
        let home = get_home_dir().map_err(|_| Error::NoHomeDir)?;
        let config_dir = Utf8PathBuf::from_path_buf(home.join(".eveset"))
            .map_err(|p| Error::invalid_config(format!("Non UTF-8 home path: {}", p.display())))?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let path = self.config_dir.join(RUNTIME_CONFIG_FILE);
        let file = if path.exists() { Some(path) } else { None };
        self.load_with_file(file.as_deref())
    }

    /// Load runtime configuration using an explicit config file in place of
    /// the one in the config directory. A missing explicit file is an error.
    pub fn load_runtime_config_from(&self, path: &Utf8Path) -> Result<RuntimeConfig> {
        if !path.exists() {
            return Err(Error::config_not_found(path.as_str()));
        }
        self.load_with_file(Some(path))
    }

    fn load_with_file(&self, file: Option<&Utf8Path>) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        if let Some(path) = file {
            tracing::debug!("Loading runtime config from {}", path);
            let file_config = Self::load_yaml_file::<RuntimeConfig>(path)?;
            config = Self::merge_runtime_config(config, file_config);
        }

        config = Self::apply_env_overrides(config)?;
        config.validate()?;

        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Merge two runtime configs (base is overridden by overlay)
    fn merge_runtime_config(base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        RuntimeConfig {
            esi: overlay.esi,
            retry_policies: Self::merge_retry_policies(base.retry_policies, overlay.retry_policies),
            backup: overlay.backup,
        }
    }

    /// Merge retry policies, keeping base operations the overlay does not name
    fn merge_retry_policies(
        mut base: RetryPoliciesConfig,
        overlay: RetryPoliciesConfig,
    ) -> RetryPoliciesConfig {
        for (key, policy) in overlay.operations {
            base.operations.insert(key, policy);
        }
        base.default = overlay.default;
        base
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("EVESET_ESI_BASE_URL") {
            config.esi.base_url = val;
        }

        if let Some(val) = parse_env("EVESET_ESI_TIMEOUT_SECS")? {
            config.esi.timeout_secs = val;
        }

        if let Some(val) = parse_env("EVESET_ESI_MAX_CONCURRENT")? {
            config.esi.max_concurrent = val;
        }

        if let Some(val) = parse_env("EVESET_LOOKUP_MAX_ATTEMPTS")? {
            let mut policy = config.retry_policies.policy_for(LOOKUP_OPERATION);
            policy.max_attempts = val;
            config
                .retry_policies
                .operations
                .insert(LOOKUP_OPERATION.to_string(), policy);
        }

        if let Some(val) = parse_env("EVESET_DISCOVERY_MAX_DEPTH")? {
            config.backup.discovery_max_depth = val;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_config(format!("{} must be a valid number", name))),
        Err(_) => Ok(None),
    }
}

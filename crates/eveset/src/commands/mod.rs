//! CLI command implementations

pub mod backup;
pub mod config;
pub mod names;
pub mod version;

use anyhow::{Context, Result};
use camino::Utf8Path;
use eveset_core::config::HierarchicalConfigLoader;
use eveset_core::types::RuntimeConfig;

/// Resolve the runtime config, honouring `--config` when given
pub(crate) fn load_runtime_config(path: Option<&Utf8Path>) -> Result<RuntimeConfig> {
    let loader = HierarchicalConfigLoader::new().context("Failed to locate config directory")?;
    let config = match path {
        Some(path) => loader
            .load_runtime_config_from(path)
            .with_context(|| format!("Failed to load runtime config from {}", path))?,
        None => loader
            .load_runtime_config()
            .context("Failed to load runtime config")?,
    };
    Ok(config)
}

//! # eveset-core
//!
//! Shared plumbing for the eveset crates:
//! - Runtime configuration (embedded defaults, user file, environment overrides)
//! - Retry execution engine with policy-based configuration
//! - Common error type and small utilities

pub mod config;
pub mod error;
pub mod retry;
pub mod types;
pub mod utils;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::RuntimeConfig;
pub use utils::get_home_dir;

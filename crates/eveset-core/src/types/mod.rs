//! Type definitions for eveset runtime configuration

mod runtime_config;

pub use runtime_config::*;

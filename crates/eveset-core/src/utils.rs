//! Shared utility functions for eveset crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Get the user's home directory
///
/// `HOME` wins over `dirs::home_dir()` so that tests and wrappers can
/// redirect the config directory.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// Format a byte count as megabytes with one decimal, e.g. `1.5 MB`
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_home_dir_from_env() {
        if std::env::var("HOME").is_ok() {
            let home = get_home_dir().unwrap();
            assert!(!home.as_os_str().is_empty());
        }
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.0 MB");
        assert_eq!(format_megabytes(1024 * 1024 * 3 / 2), "1.5 MB");
    }
}

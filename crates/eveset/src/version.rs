//! Version information for the eveset CLI

use serde::Serialize;

/// Version information
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,

    /// Git commit SHA (short)
    pub commit: Option<String>,

    pub build_date: Option<String>,
}

impl VersionInfo {
    /// Version info for the current build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            build_date: option_env!("BUILD_DATE").map(String::from),
        }
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "eveset {}", self.version)?;
        if let Some(commit) = &self.commit {
            write!(f, " ({})", commit)?;
        }
        if let Some(date) = &self.build_date {
            write!(f, " built {}", date)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_commit() {
        let info = VersionInfo {
            version: "0.4.0".to_string(),
            commit: Some("abc1234".to_string()),
            build_date: None,
        };
        assert_eq!(info.to_string(), "eveset 0.4.0 (abc1234)");
    }

    #[test]
    fn test_current_uses_package_version() {
        assert_eq!(VersionInfo::current().version, env!("CARGO_PKG_VERSION"));
    }
}

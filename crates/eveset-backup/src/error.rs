//! Backup engine errors
//!
//! Each variant's `Display` text is the message reported to the user.

use std::io;
use thiserror::Error;
use zip::result::ZipError;

pub type Result<T> = std::result::Result<T, BackupError>;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup file not found")]
    NotFound,

    #[error("Invalid or corrupted backup file")]
    Corrupted { reason: String },

    #[error("Backup archive is empty")]
    Empty,

    #[error("Permission denied: {0}")]
    PermissionDenied(#[source] io::Error),

    #[error("Base path not set")]
    BasePathNotSet,

    #[error("Profile folder does not exist: {name}")]
    ProfileNotFound { name: String },

    #[error("Not a directory: {name}")]
    NotADirectory { name: String },

    #[error("No files found to backup")]
    NoFiles,

    #[error("Error {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    /// Wrap an I/O error, pulling permission failures out into their own variant
    pub fn io(context: &'static str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(source)
        } else {
            Self::Io { context, source }
        }
    }

    /// Map a zip error; anything but an I/O failure means the archive is damaged
    pub fn zip(context: &'static str, err: ZipError) -> Self {
        match err {
            ZipError::Io(source) => Self::io(context, source),
            other => Self::corrupted(other),
        }
    }

    pub fn corrupted(reason: impl ToString) -> Self {
        Self::Corrupted {
            reason: reason.to_string(),
        }
    }

    /// User message with the underlying cause appended when there is one
    pub fn detailed(&self) -> String {
        match self {
            Self::Corrupted { reason } => format!("{}: {}", self, reason),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_errors_are_split_out() {
        let err = BackupError::io(
            "restoring backup",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, BackupError::PermissionDenied(_)));
        assert!(err.to_string().starts_with("Permission denied: "));
    }

    #[test]
    fn test_io_message_carries_context() {
        let err = BackupError::io("restoring backup", io::Error::other("disk full"));
        assert_eq!(err.to_string(), "Error restoring backup: disk full");
    }

    #[test]
    fn test_corrupted_detail() {
        let err = BackupError::corrupted("bad crc");
        assert_eq!(err.to_string(), "Invalid or corrupted backup file");
        assert_eq!(err.detailed(), "Invalid or corrupted backup file: bad crc");
    }
}

//! Error types for squashfs-extract
//!
//! This module defines all error types used throughout the application,
//! providing detailed error information for diagnostics and exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction operations
#[derive(Error, Debug)]
pub enum ExtractError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem image does not exist or is not a regular file
    #[error("Filesystem image not found: {0}")]
    ImageNotFound(PathBuf),

    /// Filesystem image has zero length
    #[error("Filesystem image is empty: {0}")]
    ImageEmpty(PathBuf),

    /// External mount tool failed
    #[error("Failed to mount '{image}' at '{mount_point}': {detail}")]
    Mount {
        image: PathBuf,
        mount_point: PathBuf,
        detail: String,
    },

    /// External umount tool failed
    #[error("Failed to unmount '{mount_point}': {detail}")]
    Unmount { mount_point: PathBuf, detail: String },

    /// Directory traversal error
    #[error("Traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Entry has a file type the copier does not recognize
    #[error("Unsupported file type at '{path}' (mode {mode:#o})")]
    UnsupportedFileType { path: PathBuf, mode: u32 },

    /// Transfer ended before the expected byte count was reached
    #[error("Short transfer for '{path}': {copied} of {expected} bytes")]
    ShortTransfer {
        path: PathBuf,
        expected: u64,
        copied: u64,
    },

    /// Symbolic link could not be read or recreated
    #[error("Symbolic link error at '{path}': {message}")]
    Symlink { path: PathBuf, message: String },

    /// One or more metadata steps failed for an entry
    ///
    /// The payload was copied; the entry is still reported failed and the
    /// copy pass aborts after its progress tick.
    #[error("Metadata incomplete for '{path}': {}", format_failures(.failures))]
    MetadataIncomplete {
        path: PathBuf,
        failures: Vec<MetadataFailure>,
    },
}

/// A single failed step of the best-effort metadata sequence
#[derive(Debug, Clone)]
pub struct MetadataFailure {
    /// Which step failed
    pub step: MetadataStep,
    /// Diagnostic text from the underlying call
    pub detail: String,
}

/// The metadata replication steps attempted for every entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStep {
    /// Permission bits (`chmod`)
    Permissions,
    /// Owner and group (`lchown`)
    Ownership,
    /// Extended attributes
    Xattr,
}

impl std::fmt::Display for MetadataStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataStep::Permissions => write!(f, "permissions"),
            MetadataStep::Ownership => write!(f, "ownership"),
            MetadataStep::Xattr => write!(f, "xattr"),
        }
    }
}

fn format_failures(failures: &[MetadataFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.step, f.detail))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ExtractError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a mount error carrying the external tool's diagnostic
    pub fn mount(
        image: impl Into<PathBuf>,
        mount_point: impl Into<PathBuf>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Mount {
            image: image.into(),
            mount_point: mount_point.into(),
            detail: detail.into(),
        }
    }

    /// Create an unmount error carrying the external tool's diagnostic
    pub fn unmount(mount_point: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Unmount {
            mount_point: mount_point.into(),
            detail: detail.into(),
        }
    }

    /// Create a symlink error
    pub fn symlink(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Symlink {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a permission issue
    pub fn is_permission_error(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::ImageNotFound(path)
            | Self::ImageEmpty(path)
            | Self::Mount { image: path, .. }
            | Self::Unmount {
                mount_point: path, ..
            }
            | Self::UnsupportedFileType { path, .. }
            | Self::ShortTransfer { path, .. }
            | Self::Symlink { path, .. }
            | Self::MetadataIncomplete { path, .. } => Some(path),
            Self::Walk(_) => None,
        }
    }
}

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| ExtractError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ExtractError::io("/test/path", io_err);
        assert!(err.path().is_some());
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
    }

    #[test]
    fn test_permission_error_detection() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ExtractError::io("/test", io_err);
        assert!(err.is_permission_error());

        let err = ExtractError::ImageEmpty(PathBuf::from("/test"));
        assert!(!err.is_permission_error());
    }

    #[test]
    fn test_metadata_incomplete_display() {
        let err = ExtractError::MetadataIncomplete {
            path: PathBuf::from("/dest/file"),
            failures: vec![
                MetadataFailure {
                    step: MetadataStep::Ownership,
                    detail: "EPERM".to_string(),
                },
                MetadataFailure {
                    step: MetadataStep::Xattr,
                    detail: "ENOTSUP".to_string(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("ownership (EPERM)"));
        assert!(text.contains("xattr (ENOTSUP)"));
    }
}

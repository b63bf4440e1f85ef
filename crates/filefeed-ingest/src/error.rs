//! Error types for filefeed ingestion
//!
//! Only a few of these stop a run: an unreadable manifest, an unreachable
//! broker and invalid configuration. Everything else is logged and handled at
//! the narrowest scope (pattern, worker, file or message).

use filefeed_common::FeedError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The manifest of path patterns could not be opened
    #[error("Failed to open manifest '{}': {source}", path.display())]
    ManifestUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file matched by a pattern could not be opened
    #[error("Failed to open file '{}': {source}", path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No connection to the Kafka cluster could be established
    #[error("Broker unavailable: {0}. Check the broker addresses and that the cluster is running.")]
    BrokerUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Common(#[from] FeedError),
}

impl IngestError {
    pub fn manifest_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ManifestUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn file_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn broker_unavailable(msg: impl Into<String>) -> Self {
        Self::BrokerUnavailable(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error must stop the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::FileUnavailable { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_manifest_error_message() {
        let err = IngestError::manifest_unavailable(
            "/etc/paths.txt",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to open manifest '/etc/paths.txt': No such file or directory"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_file_unavailable_is_worker_scoped() {
        let err = IngestError::file_unavailable(
            "/data/a1.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        );
        assert!(!err.is_fatal());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_common_errors_are_transparent() {
        let err: IngestError = FeedError::config("Topic name cannot be empty").into();
        assert_eq!(err.to_string(), "Configuration error: Topic name cannot be empty");
        assert!(err.is_fatal());
    }
}

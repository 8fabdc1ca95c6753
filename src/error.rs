// ABOUTME: Application-wide error types for stagehand.
// ABOUTME: Uses thiserror for ergonomic error handling and maps failures to exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;
use crate::deploy::{DeployError, Rejection};
use crate::store::StoreError;
use crate::types::{SnapshotHash, SnapshotHashError, StorageRootError};

/// Exit code for a rollback that failed; the live site needs a human.
pub const EXIT_CATASTROPHIC: i32 = 2;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "no API token: pass --token, set STAGEHAND_TOKEN, or configure the target in stagehand.yml"
    )]
    MissingToken,

    #[error("invalid version: {0}")]
    InvalidVersion(#[from] SnapshotHashError),

    #[error("invalid storage zone: {0}")]
    InvalidZone(#[from] StorageRootError),

    #[error("{0}")]
    Rejected(Rejection),

    #[error("activation of {} failed: {message}", hash.version_label())]
    ActivationFailed { hash: SnapshotHash, message: String },

    #[error("rollback failed, the live site may be broken: {0}")]
    RollbackFailed(String),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RollbackFailed(_) => EXIT_CATASTROPHIC,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_failure_has_distinct_exit_code() {
        assert_eq!(Error::RollbackFailed("boom".into()).exit_code(), 2);
        assert_eq!(Error::Rejected(Rejection::NoIndex).exit_code(), 1);
    }

    #[test]
    fn rejection_message_includes_reason() {
        let message = Error::Rejected(Rejection::FlushCurrentVersion).to_string();
        assert!(message.contains("flush.attempting_flush_current_version"));
    }
}

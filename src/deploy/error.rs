// ABOUTME: Error types for upload, activation, and flush operations.
// ABOUTME: SNAFU variants carry the remote key or phase that failed alongside the source.

use snafu::Snafu;
use std::path::PathBuf;

use super::state::Phase;
use crate::store::StoreError;
use crate::types::SnapshotHash;

/// Failures that abort a deployment operation.
///
/// Validation problems are not errors; they are reported as
/// [`Rejection`](super::Rejection)s.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeployError {
    #[snafu(display("failed to walk build directory {}: {source}", path.display()))]
    WalkBuild {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to upload {key}: {source}"))]
    Upload { key: String, source: StoreError },

    #[snafu(display("failed to read the live pointer: {source}"))]
    ReadPointer { source: StoreError },

    #[snafu(display("live pointer holds an invalid hash: {value:?}"))]
    CorruptPointer { value: String },

    #[snafu(display("{phase} failed for {}: {source}", hash.version_label()))]
    Promote {
        phase: Phase,
        hash: SnapshotHash,
        source: StoreError,
    },

    #[snafu(display("failed to delete {}: {source}", hash.version_label()))]
    Flush {
        hash: SnapshotHash,
        source: StoreError,
    },

    #[snafu(display("failed to list snapshots: {source}"))]
    ListSnapshots { source: StoreError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// The local build directory could not be read.
    LocalBuild,
    /// A remote operation failed after exhausting its retries.
    Transport,
    /// Remote state is not in a shape the engine understands.
    RemoteState,
}

impl DeployError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::WalkBuild { .. } | DeployError::ReadFile { .. } => {
                DeployErrorKind::LocalBuild
            }
            DeployError::CorruptPointer { .. } => DeployErrorKind::RemoteState,
            DeployError::Upload { .. }
            | DeployError::ReadPointer { .. }
            | DeployError::Promote { .. }
            | DeployError::Flush { .. }
            | DeployError::ListSnapshots { .. } => DeployErrorKind::Transport,
        }
    }

    /// The activation phase that failed, for promotion errors.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            DeployError::Promote { phase, .. } => Some(*phase),
            DeployError::ReadPointer { .. } | DeployError::CorruptPointer { .. } => {
                Some(Phase::ReadingCurrent)
            }
            _ => None,
        }
    }

    /// The underlying storage error, when there is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            DeployError::Upload { source, .. }
            | DeployError::ReadPointer { source }
            | DeployError::Promote { source, .. }
            | DeployError::Flush { source, .. }
            | DeployError::ListSnapshots { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_error_names_phase_and_version() {
        let err = DeployError::Promote {
            phase: Phase::PublishingEntry,
            hash: SnapshotHash::new("def456").unwrap(),
            source: StoreError::Transport("connection reset".to_string()),
        };

        assert_eq!(
            err.to_string(),
            "publishing-entry failed for v.def456: storage request failed: connection reset"
        );
        assert_eq!(err.kind(), DeployErrorKind::Transport);
        assert_eq!(err.phase(), Some(Phase::PublishingEntry));
        assert!(err.store_error().is_some());
    }

    #[test]
    fn corrupt_pointer_is_remote_state() {
        let err = DeployError::CorruptPointer {
            value: "../x".to_string(),
        };
        assert_eq!(err.kind(), DeployErrorKind::RemoteState);
        assert_eq!(err.phase(), Some(Phase::ReadingCurrent));
        assert!(err.store_error().is_none());
    }
}

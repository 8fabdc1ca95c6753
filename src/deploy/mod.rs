// ABOUTME: Deployment engine: upload, activation with rollback, flush, and snapshot listing.
// ABOUTME: Exports the promotion type state, its markers, and the result record types.

mod activate;
mod build;
mod engine;
mod error;
mod flush;
mod pointer;
mod promotion;
mod rejection;
mod report;
mod retry;
mod snapshots;
mod state;
mod upload;

pub use activate::{Activation, ActivationOutcome};
pub use build::{IGNORED_DIRS, LocalBuild, SOURCE_MARKER};
pub use engine::Engine;
pub use error::{DeployError, DeployErrorKind};
pub use flush::Flush;
pub use promotion::Promotion;
pub use rejection::{Outcome, Rejection};
pub use report::{
    DeploymentInput, DeploymentResult, OperationReport, OperationStatus, Operations, Stage,
};
pub use retry::{DEFAULT_RETRY_DELAY, OBJECT_RETRIES, POINTER_RETRIES, RetryPolicies, RetryPolicy};
pub use snapshots::SnapshotInfo;
pub use state::{
    EntryPublished, ErrorPageAliased, FilesPromoted, Pending, Phase, Recorded, Validated,
};

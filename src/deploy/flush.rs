// ABOUTME: Permanent deletion of a snapshot that is not live.
// ABOUTME: Refuses to touch the live version and reports a missing snapshot as a rejection.

use super::engine::Engine;
use super::error::DeployError;
use super::rejection::{Outcome, Rejection};
use crate::store::{ObjectStore, StoreError};
use crate::telemetry::Breadcrumb;
use crate::types::{SnapshotHash, StorageRoot};

/// Result of [`Engine::flush`].
#[must_use = "flush results must be reported"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flush {
    pub hash: SnapshotHash,
    /// Live version at the time of the request.
    pub current: Option<SnapshotHash>,
    pub outcome: Outcome,
}

impl<S: ObjectStore + ?Sized> Engine<'_, S> {
    /// Delete the snapshot `hash` under `root`.
    ///
    /// The delete is issued once; there is nothing to roll back if it fails.
    pub async fn flush(&self, root: &StorageRoot, hash: &SnapshotHash) -> Result<Flush, DeployError> {
        let current = self.live_version(root).await?;

        let outcome = if current.as_ref() == Some(hash) {
            tracing::warn!("{} is live, not flushing it", hash.version_label());
            Outcome::Rejected(Rejection::FlushCurrentVersion)
        } else {
            self.telemetry.breadcrumb(Breadcrumb::WillFlushVersion);
            match self.store.delete(&root.snapshot_prefix(hash)).await {
                Ok(()) => {
                    tracing::info!("Flushed {}", hash.version_label());
                    self.telemetry.breadcrumb(Breadcrumb::DidFlushVersion);
                    Outcome::Done(())
                }
                Err(StoreError::NotFound(_)) => Outcome::Rejected(Rejection::VersionNotFound),
                Err(source) => {
                    return Err(DeployError::Flush {
                        hash: hash.clone(),
                        source,
                    });
                }
            }
        };

        Ok(Flush {
            hash: hash.clone(),
            current,
            outcome,
        })
    }
}

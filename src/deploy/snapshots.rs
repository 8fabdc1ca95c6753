// ABOUTME: Listing of the snapshots stored under a root.
// ABOUTME: Newest first, with the live snapshot marked.

use chrono::{DateTime, Utc};
use serde::Serialize;
use snafu::ResultExt;

use super::engine::Engine;
use super::error::{DeployError, ListSnapshotsSnafu};
use crate::store::{ObjectStore, StoreError};
use crate::types::{SnapshotHash, StorageRoot};

/// One uploaded snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub hash: SnapshotHash,
    pub created_at: Option<DateTime<Utc>>,
    pub live: bool,
}

impl<S: ObjectStore + ?Sized> Engine<'_, S> {
    pub async fn list_snapshots(&self, root: &StorageRoot) -> Result<Vec<SnapshotInfo>, DeployError> {
        let live = self.live_version(root).await?;

        let entries = match self.store.list(&root.deployments_prefix()).await {
            Ok(entries) => entries,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e).context(ListSnapshotsSnafu),
        };

        let mut snapshots: Vec<SnapshotInfo> = entries
            .into_iter()
            .filter(|entry| entry.is_directory)
            .filter_map(|entry| match SnapshotHash::new(&entry.name) {
                Ok(hash) => Some(SnapshotInfo {
                    live: live.as_ref() == Some(&hash),
                    hash,
                    created_at: entry.created_at,
                }),
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", entry.key(), e);
                    None
                }
            })
            .collect();

        snapshots.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.hash.cmp(&b.hash))
        });
        Ok(snapshots)
    }
}

// ABOUTME: Reading and writing the live pointer object.
// ABOUTME: A missing pointer means no deployment yet; there is no lock around it.

use bytes::Bytes;
use snafu::ResultExt;

use super::engine::Engine;
use super::error::{DeployError, PromoteSnafu, ReadPointerSnafu};
use super::state::Phase;
use crate::store::{ObjectStore, StoreError};
use crate::types::{SnapshotHash, StorageRoot};

/// Placeholder older tooling wrote before the first deployment.
const LEGACY_ABSENT: &str = "0";

impl<S: ObjectStore + ?Sized> Engine<'_, S> {
    /// Read the hash of the live snapshot, `None` if nothing was ever activated.
    ///
    /// The value can change under us: concurrent activations are not
    /// serialized, so callers read it immediately before mutating and accept
    /// that the last writer wins.
    pub async fn live_version(
        &self,
        root: &StorageRoot,
    ) -> Result<Option<SnapshotHash>, DeployError> {
        let key = root.pointer_key();
        let body = match self.store.get(&key).await {
            Ok(body) => body,
            Err(StoreError::NotFound(_)) => {
                tracing::debug!("No live pointer at {} (first deployment)", key);
                return Ok(None);
            }
            Err(e) => return Err(e).context(ReadPointerSnafu),
        };

        parse_pointer(&body)
    }

    /// Record `hash` as live, under the pointer retry budget.
    pub(crate) async fn record_live_version(
        &self,
        root: &StorageRoot,
        hash: &SnapshotHash,
    ) -> Result<(), DeployError> {
        let key = root.pointer_key();
        let store = self.store;
        let body = Bytes::from(hash.as_str().to_owned());

        self.retried(self.retry.pointer, &key, || {
            let body = body.clone();
            let key = key.as_str();
            async move { store.put(key, body).await }
        })
        .await
        .context(PromoteSnafu {
            phase: Phase::RecordingPointer,
            hash: hash.clone(),
        })
    }
}

fn parse_pointer(body: &[u8]) -> Result<Option<SnapshotHash>, DeployError> {
    let value = String::from_utf8_lossy(body);
    let value = value.trim();

    if value.is_empty() || value == LEGACY_ABSENT {
        return Ok(None);
    }

    SnapshotHash::new(value)
        .map(Some)
        .map_err(|_| DeployError::CorruptPointer {
            value: value.to_string(),
        })
}

// ABOUTME: Uploader that copies a validated local build into a snapshot namespace.
// ABOUTME: Validation runs before any network I/O; each file write is retried independently.

use bytes::Bytes;
use snafu::ResultExt;

use super::build::LocalBuild;
use super::engine::Engine;
use super::error::{DeployError, ReadFileSnafu, UploadSnafu};
use super::rejection::Outcome;
use crate::store::{ObjectStore, directory_prefix};
use crate::telemetry::Breadcrumb;
use crate::types::{SnapshotHash, StorageRoot};

impl<S: ObjectStore + ?Sized> Engine<'_, S> {
    /// Upload every file of `build` below `prefix`.
    ///
    /// Returns the uploaded relative paths, or a [`Rejection`](super::Rejection) if the build
    /// is not deployable (in which case nothing is written). Files are
    /// written one at a time with no cross-file atomicity; the snapshot only
    /// becomes visible once an activation points at it.
    pub async fn sync(
        &self,
        build: &LocalBuild,
        prefix: &str,
    ) -> Result<Outcome<Vec<String>>, DeployError> {
        if let Some(rejection) = build.validate() {
            tracing::warn!("Refusing to upload {}: {}", build.root().display(), rejection);
            return Ok(Outcome::Rejected(rejection));
        }

        let prefix = directory_prefix(prefix);
        for relative in build.files() {
            let path = build.path_of(relative);
            let content = tokio::fs::read(&path)
                .await
                .context(ReadFileSnafu { path: &path })?;

            let key = format!("{prefix}{relative}");
            self.write(&key, Bytes::from(content))
                .await
                .context(UploadSnafu { key: &key })?;
            tracing::debug!("Uploaded {}", key);
        }

        Ok(Outcome::Done(build.files().to_vec()))
    }

    /// Upload `build` as the snapshot named `hash` under `root`.
    pub async fn upload_snapshot(
        &self,
        build: &LocalBuild,
        root: &StorageRoot,
        hash: &SnapshotHash,
    ) -> Result<Outcome<Vec<String>>, DeployError> {
        self.telemetry.breadcrumb(Breadcrumb::WillDeployVersion);
        let outcome = self.sync(build, &root.snapshot_prefix(hash)).await?;

        match &outcome {
            Outcome::Done(files) => {
                tracing::info!("Uploaded {} file(s) as {}", files.len(), hash.version_label());
                self.telemetry.breadcrumb(Breadcrumb::DidDeployVersion);
            }
            Outcome::Rejected(_) => {
                self.telemetry.breadcrumb(Breadcrumb::DeployVersionDidFail);
            }
        }

        Ok(outcome)
    }
}

// ABOUTME: Snapshot promotion parameterized by state marker.
// ABOUTME: Each transition consumes self, so steps can only run in their safe order.

use snafu::ResultExt;

use super::engine::Engine;
use super::error::{DeployError, PromoteSnafu};
use super::rejection::{Outcome, Rejection};
use super::state::{
    EntryPublished, ErrorPageAliased, FilesPromoted, Pending, Phase, Recorded, Validated,
};
use crate::store::{ObjectStore, list_files};
use crate::types::{ENTRY_POINT, NOT_FOUND_PAGE, SnapshotHash, StorageRoot, is_reserved_path};

/// Promotion of one snapshot into the live tree.
///
/// The state parameter `S` carries what earlier steps learned (the file
/// list, whether a custom 404 page exists). The entry point can only be
/// published after every other file is in place, and the live pointer only
/// recorded after that.
#[derive(Debug)]
pub struct Promotion<S> {
    root: StorageRoot,
    target: SnapshotHash,
    state: S,
}

impl<S> Promotion<S> {
    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    pub fn target(&self) -> &SnapshotHash {
        &self.target
    }

    fn transition<T>(self, state: T) -> Promotion<T> {
        Promotion {
            root: self.root,
            target: self.target,
            state,
        }
    }

    fn failed_in(&self, phase: Phase) -> PromoteSnafu<Phase, SnapshotHash> {
        PromoteSnafu {
            phase,
            hash: self.target.clone(),
        }
    }

    fn snapshot_key(&self, relative: &str) -> String {
        self.root.snapshot_key(&self.target, relative)
    }
}

// =============================================================================
// Pending -> Validated
// =============================================================================

impl Promotion<Pending> {
    pub fn new(root: StorageRoot, target: SnapshotHash) -> Self {
        Promotion {
            root,
            target,
            state: Pending,
        }
    }

    /// Traverse the snapshot and check it can be served.
    ///
    /// Rejects with `NoFiles` for an empty (or missing) snapshot and
    /// `NoIndex` when there is no entry point at its base.
    pub async fn validate<St: ObjectStore + ?Sized>(
        self,
        engine: &Engine<'_, St>,
    ) -> Result<Outcome<Promotion<Validated>>, DeployError> {
        let base = self.root.snapshot_prefix(&self.target);
        let keys = list_files(engine.store, &base)
            .await
            .context(self.failed_in(Phase::ValidatingSnapshot))?;

        if keys.is_empty() {
            return Ok(Outcome::Rejected(Rejection::NoFiles));
        }

        let files: Vec<String> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(&base).map(str::to_string))
            .collect();

        if !files.iter().any(|f| f == ENTRY_POINT) {
            return Ok(Outcome::Rejected(Rejection::NoIndex));
        }

        tracing::debug!(
            "{} holds {} file(s)",
            self.target.version_label(),
            files.len()
        );
        Ok(Outcome::Done(self.transition(Validated { files })))
    }
}

// =============================================================================
// Validated -> FilesPromoted
// =============================================================================

impl Promotion<Validated> {
    /// Relative paths of the snapshot's files.
    pub fn files(&self) -> &[String] {
        &self.state.files
    }

    /// Copy every file except the entry point into the live tree.
    ///
    /// Paths that would land in the snapshot or metadata namespace are
    /// skipped, so a snapshot can never rewrite another snapshot or the
    /// live pointer.
    pub async fn promote_files<St: ObjectStore + ?Sized>(
        self,
        engine: &Engine<'_, St>,
    ) -> Result<Promotion<FilesPromoted>, DeployError> {
        for relative in self.state.files.iter().filter(|f| *f != ENTRY_POINT) {
            if is_reserved_path(relative) {
                tracing::warn!(
                    "Skipping {relative} in {}: path is reserved",
                    self.target.version_label()
                );
                continue;
            }
            engine
                .alias(&self.snapshot_key(relative), &self.root.live_key(relative))
                .await
                .context(self.failed_in(Phase::PromotingFiles))?;
        }

        let has_not_found_page = self.state.files.iter().any(|f| f == NOT_FOUND_PAGE);
        Ok(self.transition(FilesPromoted { has_not_found_page }))
    }
}

// =============================================================================
// FilesPromoted -> ErrorPageAliased
// =============================================================================

impl Promotion<FilesPromoted> {
    /// Point the error-page alias at the build's 404 page, or at the entry
    /// point for single-page apps that route unknown paths themselves.
    pub async fn alias_error_page<St: ObjectStore + ?Sized>(
        self,
        engine: &Engine<'_, St>,
    ) -> Result<Promotion<ErrorPageAliased>, DeployError> {
        let source = if self.state.has_not_found_page {
            NOT_FOUND_PAGE
        } else {
            ENTRY_POINT
        };

        engine
            .alias(&self.snapshot_key(source), &self.root.error_page_key())
            .await
            .context(self.failed_in(Phase::AliasingErrorPage))?;

        Ok(self.transition(ErrorPageAliased))
    }
}

// =============================================================================
// ErrorPageAliased -> EntryPublished
// =============================================================================

impl Promotion<ErrorPageAliased> {
    /// Swap the root entry point. This is the moment users see the version.
    pub async fn publish_entry<St: ObjectStore + ?Sized>(
        self,
        engine: &Engine<'_, St>,
    ) -> Result<Promotion<EntryPublished>, DeployError> {
        engine
            .alias(
                &self.snapshot_key(ENTRY_POINT),
                &self.root.live_key(ENTRY_POINT),
            )
            .await
            .context(self.failed_in(Phase::PublishingEntry))?;

        Ok(self.transition(EntryPublished))
    }
}

// =============================================================================
// EntryPublished -> Recorded
// =============================================================================

impl Promotion<EntryPublished> {
    /// Write the target hash into the live pointer.
    pub async fn record_pointer<St: ObjectStore + ?Sized>(
        self,
        engine: &Engine<'_, St>,
    ) -> Result<Promotion<Recorded>, DeployError> {
        engine.record_live_version(&self.root, &self.target).await?;
        Ok(self.transition(Recorded))
    }
}

// =============================================================================
// Recorded - Terminal State
// =============================================================================

impl Promotion<Recorded> {
    /// Consume the promotion and return the hash now live.
    pub fn finish(self) -> SnapshotHash {
        self.target
    }
}

impl<St: ObjectStore + ?Sized> Engine<'_, St> {
    /// Run every promotion step for `target`.
    pub(crate) async fn promote(
        &self,
        root: &StorageRoot,
        target: &SnapshotHash,
    ) -> Result<Outcome<SnapshotHash>, DeployError> {
        let promotion = Promotion::new(root.clone(), target.clone());
        let validated = match promotion.validate(self).await? {
            Outcome::Done(validated) => validated,
            Outcome::Rejected(rejection) => return Ok(Outcome::Rejected(rejection)),
        };

        let live = validated
            .promote_files(self)
            .await?
            .alias_error_page(self)
            .await?
            .publish_entry(self)
            .await?
            .record_pointer(self)
            .await?
            .finish();

        Ok(Outcome::Done(live))
    }
}

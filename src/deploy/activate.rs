// ABOUTME: Activation of a snapshot with compensating rollback to the previous version.
// ABOUTME: A rollback that itself fails is reported as a distinct, fatal outcome.

use super::engine::Engine;
use super::error::DeployError;
use super::rejection::{Outcome, Rejection};
use super::state::Phase;
use crate::store::ObjectStore;
use crate::telemetry::Breadcrumb;
use crate::types::{SnapshotHash, StorageRoot};

/// How an activation ended.
#[derive(Debug)]
pub enum ActivationOutcome {
    /// The target is live.
    Activated,

    /// The target snapshot failed validation; nothing was changed.
    Rejected(Rejection),

    /// Promotion failed and there was no earlier version to restore.
    Failed { error: DeployError },

    /// Promotion failed and the previous version was restored.
    RolledBack { error: DeployError },

    /// Promotion failed and the previous snapshot was refused on re-validation.
    RollbackRejected {
        error: DeployError,
        rejection: Rejection,
    },

    /// Promotion failed and restoring the previous version failed too.
    /// The live tree may be a mix of both versions.
    RollbackFailed {
        error: DeployError,
        rollback_error: DeployError,
    },
}

/// Result of [`Engine::activate`].
#[must_use = "activation results must be reported"]
#[derive(Debug)]
pub struct Activation {
    pub target: SnapshotHash,
    /// Live version read before promotion started.
    pub previous: Option<SnapshotHash>,
    pub outcome: ActivationOutcome,
}

impl Activation {
    pub fn is_activated(&self) -> bool {
        matches!(self.outcome, ActivationOutcome::Activated)
    }

    /// Whether a rollback was attempted.
    pub fn attempted_rollback(&self) -> bool {
        matches!(
            self.outcome,
            ActivationOutcome::RolledBack { .. }
                | ActivationOutcome::RollbackRejected { .. }
                | ActivationOutcome::RollbackFailed { .. }
        )
    }

    /// The target failed but the previous version is serving again.
    pub fn is_recovered(&self) -> bool {
        matches!(self.outcome, ActivationOutcome::RolledBack { .. })
    }

    /// Rollback failed; no further automated action should be taken.
    pub fn is_fatal(&self) -> bool {
        matches!(self.outcome, ActivationOutcome::RollbackFailed { .. })
    }

    /// The promotion error, when promotion failed.
    pub fn error(&self) -> Option<&DeployError> {
        match &self.outcome {
            ActivationOutcome::Failed { error }
            | ActivationOutcome::RolledBack { error }
            | ActivationOutcome::RollbackRejected { error, .. }
            | ActivationOutcome::RollbackFailed { error, .. } => Some(error),
            ActivationOutcome::Activated | ActivationOutcome::Rejected(_) => None,
        }
    }

    /// Terminal phase the activation reached.
    pub fn phase(&self) -> Phase {
        match &self.outcome {
            ActivationOutcome::Activated | ActivationOutcome::RolledBack { .. } => Phase::Done,
            ActivationOutcome::Rejected(_) => Phase::ValidatingSnapshot,
            ActivationOutcome::Failed { error } => {
                error.phase().unwrap_or(Phase::ValidatingSnapshot)
            }
            ActivationOutcome::RollbackRejected { .. }
            | ActivationOutcome::RollbackFailed { .. } => Phase::RollbackFailed,
        }
    }

    /// The snapshot that should be live after this activation, if any is
    /// known to be.
    pub fn live(&self) -> Option<&SnapshotHash> {
        match &self.outcome {
            ActivationOutcome::Activated => Some(&self.target),
            ActivationOutcome::Rejected(_) | ActivationOutcome::Failed { .. } => {
                self.previous.as_ref()
            }
            ActivationOutcome::RolledBack { .. } => self.previous.as_ref(),
            ActivationOutcome::RollbackRejected { .. } | ActivationOutcome::RollbackFailed { .. } => {
                None
            }
        }
    }
}

impl<S: ObjectStore + ?Sized> Engine<'_, S> {
    /// Make `target` the live version under `root`.
    ///
    /// Only a failure to read the current live pointer is returned as `Err`;
    /// everything after that is described by the returned [`Activation`].
    /// If promotion fails part way and a different version was live before,
    /// that version is promoted again to undo the partial change.
    pub async fn activate(
        &self,
        root: &StorageRoot,
        target: &SnapshotHash,
    ) -> Result<Activation, DeployError> {
        let previous = self.live_version(root).await?;
        match &previous {
            Some(hash) => tracing::debug!("Live version is {}", hash.version_label()),
            None => tracing::debug!("Nothing is live under {} yet", root),
        }

        self.telemetry.breadcrumb(Breadcrumb::WillActivateVersion);
        let outcome = match self.promote(root, target).await {
            Ok(Outcome::Done(_)) => {
                tracing::info!("Activated {}", target.version_label());
                self.telemetry.breadcrumb(Breadcrumb::DidActivateVersion);
                ActivationOutcome::Activated
            }
            Ok(Outcome::Rejected(rejection)) => {
                tracing::warn!("Activation of {} refused: {}", target.version_label(), rejection);
                self.telemetry.breadcrumb(Breadcrumb::ActivateVersionDidFail);
                ActivationOutcome::Rejected(rejection)
            }
            Err(error) => self.recover(root, target, previous.as_ref(), error).await,
        };

        Ok(Activation {
            target: target.clone(),
            previous,
            outcome,
        })
    }

    async fn recover(
        &self,
        root: &StorageRoot,
        target: &SnapshotHash,
        previous: Option<&SnapshotHash>,
        error: DeployError,
    ) -> ActivationOutcome {
        self.telemetry.capture(&error);

        let Some(previous) = previous.filter(|hash| *hash != target) else {
            tracing::warn!(
                "Activation of {} failed and there is no previous version to roll back to: {}",
                target.version_label(),
                error
            );
            return ActivationOutcome::Failed { error };
        };

        tracing::warn!(
            phase = %Phase::RollingBack,
            "Activation of {} failed ({}), rolling back to {}",
            target.version_label(),
            error,
            previous.version_label()
        );
        self.telemetry.breadcrumb(Breadcrumb::WillRollbackVersion);

        match self.promote(root, previous).await {
            Ok(Outcome::Done(_)) => {
                tracing::info!("Rolled back to {}", previous.version_label());
                self.telemetry.breadcrumb(Breadcrumb::DidRollbackVersion);
                ActivationOutcome::RolledBack { error }
            }
            Ok(Outcome::Rejected(rejection)) => {
                tracing::warn!(
                    "Rollback to {} refused: {}",
                    previous.version_label(),
                    rejection
                );
                self.telemetry.breadcrumb(Breadcrumb::RollbackVersionDidFail);
                ActivationOutcome::RollbackRejected { error, rejection }
            }
            Err(rollback_error) => {
                tracing::error!(
                    "Rollback to {} failed, the site may be serving a mix of {} and {}: {}",
                    previous.version_label(),
                    previous.version_label(),
                    target.version_label(),
                    rollback_error
                );
                self.telemetry
                    .breadcrumb(Breadcrumb::RollbackVersionDidCriticallyFail);
                self.telemetry.capture(&rollback_error);
                ActivationOutcome::RollbackFailed {
                    error,
                    rollback_error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::RetryPolicies;
    use crate::store::MemoryStore;
    use crate::telemetry::RecordingTelemetry;
    use std::time::Duration;

    fn seed(store: &MemoryStore, hash: &str, files: &[(&str, &str)]) {
        for (path, body) in files {
            store.insert_at(
                &format!("zone/__DEPLOYMENTS__/{hash}/{path}"),
                body.to_string(),
                chrono::Utc::now(),
            );
        }
    }

    fn root() -> StorageRoot {
        StorageRoot::new("zone").unwrap()
    }

    #[tokio::test]
    async fn first_activation_publishes_everything() {
        let store = MemoryStore::new();
        seed(
            &store,
            "abc123",
            &[("index.html", "<h1>abc</h1>"), ("assets/app.js", "app")],
        );
        let telemetry = RecordingTelemetry::new();
        let engine = Engine::new(&store, &telemetry)
            .with_retry(RetryPolicies::with_delay(Duration::ZERO));

        let hash = SnapshotHash::new("abc123").unwrap();
        let activation = engine.activate(&root(), &hash).await.unwrap();

        assert!(activation.is_activated());
        assert_eq!(activation.previous, None);
        assert_eq!(activation.live(), Some(&hash));
        assert_eq!(store.object("zone/index.html").unwrap(), "<h1>abc</h1>");
        assert_eq!(store.object("zone/assets/app.js").unwrap(), "app");
        assert_eq!(
            store.object("zone/errors/404.html").unwrap(),
            "<h1>abc</h1>"
        );
        assert_eq!(
            store.object("zone/__DEPLOYMENTS_META__/current").unwrap(),
            "abc123"
        );
        assert_eq!(
            telemetry.breadcrumbs(),
            vec![
                Breadcrumb::WillActivateVersion,
                Breadcrumb::DidActivateVersion
            ]
        );
    }

    #[tokio::test]
    async fn custom_not_found_page_becomes_error_alias() {
        let store = MemoryStore::new();
        seed(
            &store,
            "abc123",
            &[("index.html", "home"), ("404.html", "missing")],
        );
        let telemetry = RecordingTelemetry::new();
        let engine = Engine::new(&store, &telemetry);

        let activation = engine
            .activate(&root(), &SnapshotHash::new("abc123").unwrap())
            .await
            .unwrap();

        assert!(activation.is_activated());
        assert_eq!(store.object("zone/errors/404.html").unwrap(), "missing");
        assert_eq!(store.object("zone/404.html").unwrap(), "missing");
    }

    #[tokio::test]
    async fn empty_snapshot_is_rejected_without_touching_pointer() {
        let store = MemoryStore::new();
        store.insert_at(
            "zone/__DEPLOYMENTS_META__/current",
            "abc123",
            chrono::Utc::now(),
        );
        let telemetry = RecordingTelemetry::new();
        let engine = Engine::new(&store, &telemetry);

        let activation = engine
            .activate(&root(), &SnapshotHash::new("ghost999").unwrap())
            .await
            .unwrap();

        assert!(matches!(
            activation.outcome,
            ActivationOutcome::Rejected(Rejection::NoFiles)
        ));
        assert!(!activation.attempted_rollback());
        assert_eq!(
            store.object("zone/__DEPLOYMENTS_META__/current").unwrap(),
            "abc123"
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_without_index_is_rejected() {
        let store = MemoryStore::new();
        seed(&store, "abc123", &[("about.html", "about")]);
        let telemetry = RecordingTelemetry::new();
        let engine = Engine::new(&store, &telemetry);

        let activation = engine
            .activate(&root(), &SnapshotHash::new("abc123").unwrap())
            .await
            .unwrap();

        assert!(matches!(
            activation.outcome,
            ActivationOutcome::Rejected(Rejection::NoIndex)
        ));
        assert!(!store.contains("zone/about.html"));
    }
}

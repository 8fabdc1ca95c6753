// ABOUTME: Structured record of one deployment attempt, built up stage by stage.
// ABOUTME: Serialized for the control plane and for --json output.

use serde::Serialize;
use std::path::PathBuf;

use super::activate::{Activation, ActivationOutcome};
use super::flush::Flush;
use super::rejection::{Outcome, Rejection};
use crate::types::{DeploymentId, SnapshotHash};

/// Result of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Ok,
    Error,
    /// Rollback failed; the live site is in an unknown state.
    Fatal,
}

/// What happened in one stage (deploy, activate, rollback, flush).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
    pub hash: Option<SnapshotHash>,
    pub current_hash: Option<SnapshotHash>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    pub warnings: Vec<String>,
}

impl OperationReport {
    fn with_status(status: OperationStatus) -> Self {
        Self {
            status,
            reason: None,
            hash: None,
            current_hash: None,
            files: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::with_status(OperationStatus::Ok)
    }

    pub fn error() -> Self {
        Self::with_status(OperationStatus::Error)
    }

    pub fn fatal() -> Self {
        Self::with_status(OperationStatus::Fatal)
    }

    pub fn with_hash(mut self, hash: &SnapshotHash) -> Self {
        self.hash = Some(hash.clone());
        self
    }

    pub fn with_current_hash(mut self, current: Option<&SnapshotHash>) -> Self {
        self.current_hash = current.cloned();
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Record a rejection. Marks the stage as failed.
    pub fn with_rejection(mut self, rejection: Rejection) -> Self {
        if self.status == OperationStatus::Ok {
            self.status = OperationStatus::Error;
        }
        self.reason = Some(rejection);
        self.warnings.push(rejection.reason().to_string());
        self
    }

    pub fn with_warning(mut self, warning: impl ToString) -> Self {
        self.warnings.push(warning.to_string());
        self
    }

    /// Report for an upload outcome.
    pub fn for_upload(hash: &SnapshotHash, outcome: Outcome<Vec<String>>) -> Self {
        match outcome {
            Outcome::Done(files) => Self::ok().with_hash(hash).with_files(files),
            Outcome::Rejected(rejection) => Self::error().with_hash(hash).with_rejection(rejection),
        }
    }

    /// Report for a flush.
    pub fn for_flush(flush: &Flush) -> Self {
        let report = match flush.outcome {
            Outcome::Done(()) => Self::ok(),
            Outcome::Rejected(rejection) => Self::error().with_rejection(rejection),
        };
        report
            .with_hash(&flush.hash)
            .with_current_hash(flush.current.as_ref())
    }
}

/// Arguments the attempt was started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInput {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<SnapshotHash>,
    pub activate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<DeploymentId>,
}

impl DeploymentInput {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            dir: None,
            hash: None,
            activate: false,
            deployment_id: None,
        }
    }
}

/// Per-stage reports; absent stages did not run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Operations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<OperationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activate: Option<OperationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback: Option<OperationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flush: Option<OperationReport>,
}

/// Record of one deployment attempt.
///
/// Each stage returns a new value with its report merged in; nothing is
/// mutated behind a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentResult {
    pub input: DeploymentInput,
    pub operations: Operations,
}

impl DeploymentResult {
    pub fn new(input: DeploymentInput) -> Self {
        Self {
            input,
            operations: Operations::default(),
        }
    }

    pub fn with_deployment_id(mut self, id: DeploymentId) -> Self {
        self.input.deployment_id = Some(id);
        self
    }

    pub fn with_hash(mut self, hash: &SnapshotHash) -> Self {
        self.input.hash = Some(hash.clone());
        self
    }

    pub fn with_deploy(mut self, report: OperationReport) -> Self {
        self.operations.deploy = Some(report);
        self
    }

    pub fn with_flush(mut self, report: OperationReport) -> Self {
        self.operations.flush = Some(report);
        self
    }

    /// Merge the activate stage, and the rollback stage when one ran.
    pub fn with_activation(mut self, activation: &Activation) -> Self {
        let current = activation.previous.as_ref();
        let activate_report = |report: OperationReport| {
            report
                .with_hash(&activation.target)
                .with_current_hash(current)
        };
        let rollback_report = |report: OperationReport| report.with_current_hash(current);

        let (activate, rollback) = match &activation.outcome {
            ActivationOutcome::Activated => (activate_report(OperationReport::ok()), None),
            ActivationOutcome::Rejected(rejection) => (
                activate_report(OperationReport::error().with_rejection(*rejection)),
                None,
            ),
            ActivationOutcome::Failed { error } => (
                activate_report(OperationReport::error().with_warning(error)),
                None,
            ),
            ActivationOutcome::RolledBack { error } => (
                activate_report(OperationReport::error().with_warning(error)),
                Some(rollback_report(OperationReport::ok())),
            ),
            ActivationOutcome::RollbackRejected { error, rejection } => (
                activate_report(OperationReport::error().with_warning(error)),
                Some(rollback_report(OperationReport::error().with_rejection(*rejection))),
            ),
            ActivationOutcome::RollbackFailed {
                error,
                rollback_error,
            } => (
                activate_report(OperationReport::error().with_warning(error)),
                Some(rollback_report(OperationReport::fatal().with_warning(rollback_error))),
            ),
        };

        self.operations.activate = Some(activate);
        self.operations.rollback = rollback;
        self
    }

    /// Record an error that aborted a stage before it could produce an outcome.
    pub fn with_stage_error(mut self, stage: Stage, error: impl ToString) -> Self {
        let report = OperationReport::error().with_warning(error);
        let slot = match stage {
            Stage::Deploy => &mut self.operations.deploy,
            Stage::Activate => &mut self.operations.activate,
            Stage::Flush => &mut self.operations.flush,
        };
        *slot = Some(report);
        self
    }

    /// Worst status across all stages that ran.
    ///
    /// An activate failure undone by a successful rollback does not count.
    pub fn status(&self) -> OperationStatus {
        let ops = &self.operations;
        let recovered = ops
            .rollback
            .as_ref()
            .is_some_and(|r| r.status == OperationStatus::Ok);

        let activate = ops.activate.as_ref().filter(|_| !recovered);
        [ops.deploy.as_ref(), activate, ops.rollback.as_ref(), ops.flush.as_ref()]
            .into_iter()
            .flatten()
            .map(|r| r.status)
            .fold(OperationStatus::Ok, worst)
    }
}

/// Stages that can abort with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Deploy,
    Activate,
    Flush,
}

fn worst(a: OperationStatus, b: OperationStatus) -> OperationStatus {
    match (a, b) {
        (OperationStatus::Fatal, _) | (_, OperationStatus::Fatal) => OperationStatus::Fatal,
        (OperationStatus::Error, _) | (_, OperationStatus::Error) => OperationStatus::Error,
        _ => OperationStatus::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{DeployError, Phase};
    use crate::store::StoreError;

    fn hash(value: &str) -> SnapshotHash {
        SnapshotHash::new(value).unwrap()
    }

    fn promote_error(phase: Phase, target: &str) -> DeployError {
        DeployError::Promote {
            phase,
            hash: hash(target),
            source: StoreError::Transport("connection reset".to_string()),
        }
    }

    #[test]
    fn rejection_is_recorded_as_reason_and_warning() {
        let report = OperationReport::for_upload(&hash("abc123"), Outcome::Rejected(Rejection::NoIndex));

        assert_eq!(report.status, OperationStatus::Error);
        assert_eq!(report.reason, Some(Rejection::NoIndex));
        assert_eq!(report.warnings, vec!["deployment.no_index"]);
    }

    #[test]
    fn recovered_activation_serializes_rollback_ok() {
        let activation = Activation {
            target: hash("def456"),
            previous: Some(hash("abc123")),
            outcome: ActivationOutcome::RolledBack {
                error: promote_error(Phase::PromotingFiles, "def456"),
            },
        };

        let result = DeploymentResult::new(DeploymentInput::new("site")).with_activation(&activation);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["operations"]["activate"]["status"], "error");
        assert_eq!(json["operations"]["activate"]["currentHash"], "abc123");
        assert_eq!(json["operations"]["rollback"]["status"], "ok");
        assert_eq!(json["operations"]["rollback"]["currentHash"], "abc123");
        assert_eq!(result.status(), OperationStatus::Ok);
    }

    #[test]
    fn failed_rollback_is_fatal() {
        let activation = Activation {
            target: hash("def456"),
            previous: Some(hash("abc123")),
            outcome: ActivationOutcome::RollbackFailed {
                error: promote_error(Phase::PublishingEntry, "def456"),
                rollback_error: promote_error(Phase::PromotingFiles, "abc123"),
            },
        };

        let result = DeploymentResult::new(DeploymentInput::new("site")).with_activation(&activation);

        assert_eq!(result.status(), OperationStatus::Fatal);
        let rollback = result.operations.rollback.unwrap();
        assert_eq!(rollback.warnings.len(), 1);
        assert!(rollback.warnings[0].contains("v.abc123"));
    }

    #[test]
    fn first_activation_has_null_current_hash() {
        let activation = Activation {
            target: hash("abc123"),
            previous: None,
            outcome: ActivationOutcome::Activated,
        };

        let result = DeploymentResult::new(DeploymentInput::new("site")).with_activation(&activation);
        let json = serde_json::to_value(&result).unwrap();

        assert!(json["operations"]["activate"]["currentHash"].is_null());
        assert!(json["operations"].get("rollback").is_none());
    }

    #[test]
    fn stage_error_marks_result_failed() {
        let result = DeploymentResult::new(DeploymentInput::new("site"))
            .with_deploy(OperationReport::ok())
            .with_stage_error(Stage::Activate, "failed to read the live pointer");

        assert_eq!(result.status(), OperationStatus::Error);
    }
}

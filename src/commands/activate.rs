// ABOUTME: Activate command implementation.
// ABOUTME: Promotes an uploaded version and turns the engine's outcome into an exit status.

use super::session::TargetSession;
use stagehand::config::Config;
use stagehand::deploy::{
    Activation, ActivationOutcome, DeploymentInput, DeploymentResult, Engine, Stage,
};
use stagehand::diagnostics::{Diagnostics, Warning};
use stagehand::error::{Error, Result};
use stagehand::output::Output;
use stagehand::store::ObjectStore;
use stagehand::telemetry::TracingTelemetry;
use stagehand::types::{SnapshotHash, StorageRoot};

/// Make `version` live on `target`.
pub async fn activate(
    config: &Config,
    token: Option<&str>,
    target: &str,
    version: &str,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let hash = SnapshotHash::parse_version(version)?;
    let telemetry = TracingTelemetry;
    let mut diag = Diagnostics::default();

    let result = DeploymentResult::new(DeploymentInput::new(target)).with_hash(&hash);
    let (session, result) =
        TargetSession::open(config, token, target, &hash, result, &telemetry, &output).await?;

    let engine = Engine::new(&session.store, &telemetry).with_retry(config.retry.policies());
    let (result, verdict) =
        run_activation(&engine, &session.root, &hash, result, &output, &mut diag).await;

    session.submit(&result, &mut diag).await;
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    output.report(&result);
    verdict
}

/// Activate `hash` and merge the outcome into `result`.
pub(super) async fn run_activation<S: ObjectStore + ?Sized>(
    engine: &Engine<'_, S>,
    root: &StorageRoot,
    hash: &SnapshotHash,
    result: DeploymentResult,
    output: &Output,
    diag: &mut Diagnostics,
) -> (DeploymentResult, Result<()>) {
    output.progress(&format!("  → Activating {}...", hash.version_label()));

    let activation = match engine.activate(root, hash).await {
        Ok(activation) => activation,
        Err(e) => return (result.with_stage_error(Stage::Activate, &e), Err(e.into())),
    };

    let result = result.with_activation(&activation);
    let verdict = exit_status(&activation, output, diag);
    (result, verdict)
}

fn exit_status(activation: &Activation, output: &Output, diag: &mut Diagnostics) -> Result<()> {
    let label = activation.target.version_label();
    let previous = activation
        .previous
        .as_ref()
        .map(SnapshotHash::version_label)
        .unwrap_or_else(|| "the previous version".to_string());

    match &activation.outcome {
        ActivationOutcome::Activated => {
            output.success(&format!("{label} is live"));
            Ok(())
        }
        ActivationOutcome::Rejected(rejection) => Err(Error::Rejected(*rejection)),
        ActivationOutcome::Failed { error } => Err(Error::ActivationFailed {
            hash: activation.target.clone(),
            message: format!("{error}; there is no previous version to roll back to"),
        }),
        ActivationOutcome::RolledBack { error } => {
            diag.warn(Warning::rolled_back(format!(
                "Activation of {label} failed: {error}"
            )));
            output.success(&format!("Rolled back to {previous}"));
            Ok(())
        }
        ActivationOutcome::RollbackRejected { error, rejection } => Err(Error::ActivationFailed {
            hash: activation.target.clone(),
            message: format!("{error}; rollback to {previous} was refused: {rejection}"),
        }),
        ActivationOutcome::RollbackFailed {
            error,
            rollback_error,
        } => Err(Error::RollbackFailed(format!(
            "activation of {label} failed ({error}) and rolling back to {previous} failed ({rollback_error})"
        ))),
    }
}

// ABOUTME: Deploy command implementation.
// ABOUTME: Fingerprints and uploads a build, then optionally activates it.

use super::activate::run_activation;
use super::session::TargetSession;
use stagehand::config::Config;
use stagehand::deploy::{
    DeploymentInput, DeploymentResult, Engine, LocalBuild, OperationReport, Stage,
};
use stagehand::diagnostics::Diagnostics;
use stagehand::error::{Error, Result};
use stagehand::output::Output;
use stagehand::store::ObjectStore;
use stagehand::telemetry::TracingTelemetry;
use stagehand::types::{SnapshotHash, StorageRoot};
use std::path::Path;

/// Upload `dir` to `target`, activating it when `activate` is set.
pub async fn deploy(
    config: &Config,
    token: Option<&str>,
    target: &str,
    dir: &Path,
    activate: bool,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let telemetry = TracingTelemetry;
    let mut diag = Diagnostics::default();

    let build = LocalBuild::open(dir)?;
    let hash = build.fingerprint()?;
    output.progress(&format!(
        "Deploying {} ({} file(s)) as {}",
        dir.display(),
        build.files().len(),
        hash.version_label()
    ));

    let input = DeploymentInput {
        dir: Some(dir.to_path_buf()),
        hash: Some(hash.clone()),
        activate,
        ..DeploymentInput::new(target)
    };
    let result = DeploymentResult::new(input);
    let (session, result) =
        TargetSession::open(config, token, target, &hash, result, &telemetry, &output).await?;

    let engine = Engine::new(&session.store, &telemetry).with_retry(config.retry.policies());
    let (result, verdict) = run_deploy(
        &engine,
        &build,
        &session.root,
        &hash,
        activate,
        result,
        &output,
        &mut diag,
    )
    .await;

    session.submit(&result, &mut diag).await;
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    output.report(&result);
    verdict
}

#[allow(clippy::too_many_arguments)]
async fn run_deploy<S: ObjectStore + ?Sized>(
    engine: &Engine<'_, S>,
    build: &LocalBuild,
    root: &StorageRoot,
    hash: &SnapshotHash,
    activate: bool,
    result: DeploymentResult,
    output: &Output,
    diag: &mut Diagnostics,
) -> (DeploymentResult, Result<()>) {
    output.progress("  → Uploading files...");

    let upload = match engine.upload_snapshot(build, root, hash).await {
        Ok(upload) => upload,
        Err(e) => return (result.with_stage_error(Stage::Deploy, &e), Err(e.into())),
    };

    let rejection = upload.rejection();
    let result = result.with_deploy(OperationReport::for_upload(hash, upload));
    if let Some(rejection) = rejection {
        return (result, Err(Error::Rejected(rejection)));
    }
    output.success(&format!("Deployed {}", hash.version_label()));

    if !activate {
        return (result, Ok(()));
    }
    run_activation(engine, root, hash, result, output, diag).await
}

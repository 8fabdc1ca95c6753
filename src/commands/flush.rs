// ABOUTME: Flush command implementation.
// ABOUTME: Deletes an uploaded version that is not live.

use super::session::TargetSession;
use stagehand::config::Config;
use stagehand::deploy::{
    DeploymentInput, DeploymentResult, Engine, OperationReport, Outcome, Stage,
};
use stagehand::diagnostics::Diagnostics;
use stagehand::error::{Error, Result};
use stagehand::output::Output;
use stagehand::telemetry::TracingTelemetry;
use stagehand::types::SnapshotHash;

pub async fn flush(
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

    output.progress(&format!("  → Flushing {}...", hash.version_label()));
    let engine = Engine::new(&session.store, &telemetry).with_retry(config.retry.policies());

    let (result, verdict) = match engine.flush(&session.root, &hash).await {
        Ok(flush) => {
            let verdict = match flush.outcome {
                Outcome::Done(()) => {
                    output.success(&format!("Flushed {}", hash.version_label()));
                    Ok(())
                }
                Outcome::Rejected(rejection) => Err(Error::Rejected(rejection)),
            };
            (result.with_flush(OperationReport::for_flush(&flush)), verdict)
        }
        Err(e) => (result.with_stage_error(Stage::Flush, &e), Err(e.into())),
    };

    session.submit(&result, &mut diag).await;
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    output.report(&result);
    verdict
}

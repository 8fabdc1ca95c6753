// ABOUTME: Deployments command implementation.
// ABOUTME: Lists uploaded versions of a target, newest first.

use super::session::TargetSession;
use stagehand::config::Config;
use stagehand::deploy::Engine;
use stagehand::error::Result;
use stagehand::output::{Output, OutputMode};
use stagehand::telemetry::TracingTelemetry;

pub async fn deployments(
    config: &Config,
    token: Option<&str>,
    target: &str,
    output: Output,
) -> Result<()> {
    let session = TargetSession::lookup(config, token, target).await?;
    let telemetry = TracingTelemetry;
    let engine = Engine::new(&session.store, &telemetry);

    let snapshots = engine.list_snapshots(&session.root).await?;

    if output.mode() == OutputMode::Json {
        output.report(&snapshots);
        return Ok(());
    }

    if snapshots.is_empty() {
        output.success(&format!("No versions uploaded to {target}"));
        return Ok(());
    }

    for snapshot in &snapshots {
        let created = snapshot
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        let marker = if snapshot.live { "  (live)" } else { "" };
        println!("{}  {}{}", snapshot.hash.version_label(), created, marker);
    }
    Ok(())
}

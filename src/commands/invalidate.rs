// ABOUTME: Invalidate command implementation.
// ABOUTME: Asks the control plane to purge cached pages for a target.

use super::session::control_plane;
use stagehand::api::ControlPlane;
use stagehand::config::Config;
use stagehand::error::Result;
use stagehand::output::Output;

pub async fn invalidate(
    config: &Config,
    token: Option<&str>,
    target: &str,
    paths: &[String],
    output: Output,
) -> Result<()> {
    let paths: Vec<String> = paths
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let control = control_plane(config, token).await?;
    let target_id = control.resolve_target(target).await?;
    control.invalidate(&target_id, &paths).await?;

    output.success(&format!(
        "Invalidated {} on {target}",
        paths.join(", ")
    ));
    Ok(())
}

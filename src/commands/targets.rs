// ABOUTME: Targets command implementation.
// ABOUTME: Lists control-plane targets with their nicknames.

use super::session::control_plane;
use stagehand::api::ControlPlane;
use stagehand::config::Config;
use stagehand::error::Result;
use stagehand::output::{Output, OutputMode};

pub async fn targets(config: &Config, token: Option<&str>, output: Output) -> Result<()> {
    let targets = control_plane(config, token).await?.list_targets().await?;

    if output.mode() == OutputMode::Json {
        output.report(&targets);
        return Ok(());
    }

    if targets.is_empty() {
        output.success("No targets");
        return Ok(());
    }

    for target in &targets {
        println!("{}  {}", target.id, target.nickname.as_deref().unwrap_or("-"));
    }
    Ok(())
}

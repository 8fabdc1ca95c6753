// ABOUTME: Token command implementation.
// ABOUTME: Issues a long-lived API token for CI, shown once.

use super::session::control_plane;
use serde_json::json;
use stagehand::api::ControlPlane;
use stagehand::config::Config;
use stagehand::error::Result;
use stagehand::output::{Output, OutputMode};

pub async fn token(config: &Config, token: Option<&str>, output: Output) -> Result<()> {
    let issued = control_plane(config, token).await?.create_token().await?;

    if output.mode() == OutputMode::Json {
        output.report(&json!({ "token": issued }));
        return Ok(());
    }

    output.warning("Record this token now; it cannot be retrieved again");
    println!("{issued}");
    Ok(())
}

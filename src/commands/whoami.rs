// ABOUTME: Whoami command implementation.
// ABOUTME: Shows which account the current API token belongs to.

use super::session::client;
use stagehand::api::ControlPlane;
use stagehand::config::Config;
use stagehand::error::Result;
use stagehand::output::{Output, OutputMode};

pub async fn whoami(config: &Config, token: Option<&str>, output: Output) -> Result<()> {
    let user = client(config, token)?.current_user().await?;

    if output.mode() == OutputMode::Json {
        output.report(&user);
    } else {
        output.success(&format!("Authenticated as {}", user.email));
    }
    Ok(())
}

// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a commented stagehand.yml template.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

pub(super) const TEMPLATE: &str = r#"# Control plane. The token may also come from --token or STAGEHAND_TOKEN.
api:
  url: https://api.stagehand.dev
  # token:
  #   env: STAGEHAND_TOKEN
  timeout: 30s

storage:
  endpoint: https://storage.bunnycdn.com
  timeout: 60s

# Retries after the first attempt, with a fixed pause between attempts.
retry:
  object: 2
  pointer: 5
  delay: 500ms

# Targets deployed with their own storage credentials. Targets not listed
# here are registered with the control plane, which supplies credentials.
# targets:
#   staging:
#     zone: my-site-staging
#     access_key:
#       env: STAGING_STORAGE_KEY
"#;

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;
    tracing::debug!("Wrote {}", config_path.display());

    Ok(())
}

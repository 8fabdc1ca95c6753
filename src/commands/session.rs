// ABOUTME: Resolves storage credentials for a target and reports results back.
// ABOUTME: Configured targets use their own keys; others are registered with the control plane.

use stagehand::api::{ControlPlane, HttpControlPlane, StorageCredentials};
use stagehand::config::Config;
use stagehand::deploy::DeploymentResult;
use stagehand::diagnostics::{Diagnostics, Warning};
use stagehand::error::{Error, Result};
use stagehand::output::Output;
use stagehand::store::HttpStore;
use stagehand::telemetry::{Breadcrumb, Telemetry};
use stagehand::types::{DeploymentId, SnapshotHash, StorageRoot, TargetId};

/// Control-plane record the final result is reported to.
struct Registered {
    control: HttpControlPlane,
    target: TargetId,
    id: DeploymentId,
}

/// Storage access for one command against one target.
pub struct TargetSession {
    pub root: StorageRoot,
    pub store: HttpStore,
    registered: Option<Registered>,
}

impl TargetSession {
    /// Resolve credentials for `target`, registering an attempt for `hash`
    /// when the target is not configured locally.
    ///
    /// Returns the result record with the deployment id filled in.
    pub async fn open(
        config: &Config,
        token: Option<&str>,
        target: &str,
        hash: &SnapshotHash,
        result: DeploymentResult,
        telemetry: &dyn Telemetry,
        output: &Output,
    ) -> Result<(Self, DeploymentResult)> {
        if let Some(configured) = config.target(target) {
            output.progress(&format!("  → Using storage zone {}", configured.zone));
            let credentials = StorageCredentials {
                zone: configured.zone.clone(),
                access_key: configured.access_key.resolve()?,
            };
            let session = Self::connect(config, credentials, None)?;
            return Ok((session, result));
        }

        let control = control_plane(config, token).await?;
        let target_id = control.resolve_target(target).await?;

        output.progress("  → Registering deployment...");
        telemetry.breadcrumb(Breadcrumb::WillRegisterDeployment);
        let registration = control
            .register_deployment(&target_id, hash, &result)
            .await?;
        telemetry.breadcrumb(Breadcrumb::DidRegisterDeployment);

        let result = result.with_deployment_id(registration.id.clone());
        let registered = Registered {
            control,
            target: target_id,
            id: registration.id,
        };
        let session = Self::connect(config, registration.storage, Some(registered))?;
        Ok((session, result))
    }

    /// Resolve credentials without registering a deployment attempt.
    pub async fn lookup(config: &Config, token: Option<&str>, target: &str) -> Result<Self> {
        let credentials = match config.target(target) {
            Some(configured) => StorageCredentials {
                zone: configured.zone.clone(),
                access_key: configured.access_key.resolve()?,
            },
            None => {
                let control = control_plane(config, token).await?;
                let target_id = control.resolve_target(target).await?;
                control.describe_target(&target_id).await?
            }
        };
        Self::connect(config, credentials, None)
    }

    fn connect(
        config: &Config,
        credentials: StorageCredentials,
        registered: Option<Registered>,
    ) -> Result<Self> {
        let store = HttpStore::new(
            &config.storage.endpoint,
            credentials.access_key,
            config.storage.timeout,
        )?;
        Ok(Self {
            root: credentials.zone,
            store,
            registered,
        })
    }

    /// Submit the final result record, if an attempt was registered.
    ///
    /// Runs on success and failure alike; a failed submission only warns.
    pub async fn submit(&self, result: &DeploymentResult, diag: &mut Diagnostics) {
        let Some(registered) = &self.registered else {
            return;
        };

        if let Err(e) = registered
            .control
            .update_deployment(&registered.target, &registered.id, result)
            .await
        {
            diag.warn(Warning::result_not_recorded(format!(
                "Failed to record the result of deployment {}: {}",
                registered.id, e
            )));
        }
    }
}

/// Control-plane client, failing when no token is available.
///
/// The token is not checked; see [`control_plane`].
pub fn client(config: &Config, token: Option<&str>) -> Result<HttpControlPlane> {
    let token = config.api_token(token)?.ok_or(Error::MissingToken)?;
    Ok(HttpControlPlane::new(
        &config.api.url,
        token,
        config.api.timeout,
    )?)
}

/// Control-plane client whose token has been accepted by the server.
pub async fn control_plane(config: &Config, token: Option<&str>) -> Result<HttpControlPlane> {
    let control = client(config, token)?;
    let user = control.current_user().await?;
    tracing::debug!("Authenticated as {}", user.email);
    Ok(control)
}

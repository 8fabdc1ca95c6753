// ABOUTME: Control-plane seam: targets, tokens, deployment registration, result records, invalidation.
// ABOUTME: The engine never depends on it; commands use it to obtain credentials and report.

mod error;
mod http;

pub use error::ApiError;
pub use http::{DEFAULT_API_URL, HttpControlPlane, TOKEN_HEADER};

use async_trait::async_trait;
use serde::Serialize;

use crate::deploy::DeploymentResult;
use crate::types::{DeploymentId, SnapshotHash, StorageRoot, TargetId};

/// Storage credentials handed out for one deployment attempt.
#[derive(Clone)]
pub struct StorageCredentials {
    pub zone: StorageRoot,
    pub access_key: String,
}

impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

/// A registered deployment attempt.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: DeploymentId,
    pub storage: StorageCredentials,
}

/// A target the token's owner can deploy to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub id: TargetId,
    pub nickname: Option<String>,
}

/// Owner of an API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub email: String,
}

/// Find a target by id, falling back to its nickname.
pub fn find_target<'a>(targets: &'a [TargetSummary], name: &str) -> Option<&'a TargetSummary> {
    targets
        .iter()
        .find(|t| t.id.as_str() == name)
        .or_else(|| targets.iter().find(|t| t.nickname.as_deref() == Some(name)))
}

/// Remote service that tracks deployment attempts for a target.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Owner of the token; fails with `Unauthorized` for a bad token.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Issue a new long-lived token for CI use.
    async fn create_token(&self) -> Result<String, ApiError>;

    /// Targets visible to the token's owner.
    async fn list_targets(&self) -> Result<Vec<TargetSummary>, ApiError>;

    /// Map a target id or nickname to its id.
    async fn resolve_target(&self, name: &str) -> Result<TargetId, ApiError> {
        let targets = self.list_targets().await?;
        find_target(&targets, name)
            .map(|t| t.id.clone())
            .ok_or_else(|| ApiError::UnknownTarget(name.to_string()))
    }

    /// Register an attempt for `hash` and obtain storage credentials.
    async fn register_deployment(
        &self,
        target: &TargetId,
        hash: &SnapshotHash,
        result: &DeploymentResult,
    ) -> Result<Registration, ApiError>;

    /// Storage credentials of a target, without registering an attempt.
    async fn describe_target(&self, target: &TargetId) -> Result<StorageCredentials, ApiError>;

    /// Replace the result record of a registered attempt.
    async fn update_deployment(
        &self,
        target: &TargetId,
        id: &DeploymentId,
        result: &DeploymentResult,
    ) -> Result<(), ApiError>;

    /// Purge cached pages matching `paths` (globs, `*` for everything).
    async fn invalidate(&self, target: &TargetId, paths: &[String]) -> Result<(), ApiError>;
}

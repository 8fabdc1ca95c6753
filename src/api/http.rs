// ABOUTME: HTTP client for the control-plane API.
// ABOUTME: JSON over reqwest, authenticated with a per-user token header.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use super::{ApiError, ControlPlane, Registration, StorageCredentials, TargetSummary, User};
use crate::deploy::DeploymentResult;
use crate::types::{DeploymentId, SnapshotHash, StorageRoot, TargetId};

/// Default control-plane base URL.
pub const DEFAULT_API_URL: &str = "https://api.stagehand.dev";

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "X-Stagehand-Token";

/// Control plane reached over HTTPS.
pub struct HttpControlPlane {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpControlPlane")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RegistrationResponse {
    id: String,
    storage: StorageResponse,
}

#[derive(Debug, Deserialize)]
struct TargetResponse {
    storage: StorageResponse,
}

#[derive(Debug, Deserialize)]
struct TargetEntry {
    id: String,
    #[serde(default)]
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    email: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct StorageResponse {
    zone: String,
    access_key: String,
}

impl TryFrom<StorageResponse> for StorageCredentials {
    type Error = ApiError;

    fn try_from(storage: StorageResponse) -> Result<Self, Self::Error> {
        let zone = StorageRoot::new(&storage.zone)
            .map_err(|e| ApiError::InvalidResponse(format!("storage zone: {e}")))?;
        Ok(StorageCredentials {
            zone,
            access_key: storage.access_key,
        })
    }
}

impl HttpControlPlane {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn target_url(&self, target: &TargetId, rest: &str) -> String {
        format!(
            "{}/api/v1/targets/{}{}",
            self.base_url,
            target.url_segment(),
            rest
        )
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = request
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ApiError::Unauthorized)
        } else if status == StatusCode::NOT_FOUND {
            Err(ApiError::NotFound(response.url().path().to_string()))
        } else {
            let message = response.text().await.unwrap_or_else(|e| e.to_string());
            Err(ApiError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn current_user(&self) -> Result<User, ApiError> {
        let response: UserResponse = self.send_json(self.client.get(self.url("users/current"))).await?;
        Ok(User {
            email: response.email,
        })
    }

    async fn create_token(&self) -> Result<String, ApiError> {
        let request = self.client.post(self.url("cli_tokens")).json(&json!({}));
        let response: TokenResponse = self.send_json(request).await?;
        Ok(response.token)
    }

    async fn list_targets(&self) -> Result<Vec<TargetSummary>, ApiError> {
        let entries: Vec<TargetEntry> = self.send_json(self.client.get(self.url("targets"))).await?;
        Ok(entries
            .into_iter()
            .map(|e| TargetSummary {
                id: TargetId::new(e.id),
                nickname: e.nickname.filter(|n| !n.is_empty()),
            })
            .collect())
    }

    async fn register_deployment(
        &self,
        target: &TargetId,
        hash: &SnapshotHash,
        result: &DeploymentResult,
    ) -> Result<Registration, ApiError> {
        let url = self.target_url(target, "/deployments");
        let body = json!({ "data": { "hash": hash, "results": result } });
        let response: RegistrationResponse = self.send_json(self.client.post(url).json(&body)).await?;

        tracing::debug!("Registered deployment {} for {}", response.id, target);

        Ok(Registration {
            id: DeploymentId::new(response.id),
            storage: response.storage.try_into()?,
        })
    }

    async fn describe_target(&self, target: &TargetId) -> Result<StorageCredentials, ApiError> {
        let url = self.target_url(target, "");
        let response: TargetResponse = self.send_json(self.client.get(url)).await?;
        response.storage.try_into()
    }

    async fn update_deployment(
        &self,
        target: &TargetId,
        id: &DeploymentId,
        result: &DeploymentResult,
    ) -> Result<(), ApiError> {
        let url = self.target_url(
            target,
            &format!("/deployments/{}", id.url_segment()),
        );
        let body = json!({ "data": { "results": result } });
        self.send(self.client.patch(url).json(&body)).await
    }

    async fn invalidate(&self, target: &TargetId, paths: &[String]) -> Result<(), ApiError> {
        let url = self.target_url(target, "/invalidations");
        let body = json!({ "invalidation": { "pages": paths } });
        self.send(self.client.post(url).json(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::DeploymentInput;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpControlPlane {
        HttpControlPlane::new(&server.uri(), "tok", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn current_user_reads_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/current"))
            .and(header(TOKEN_HEADER, "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "email": "dev@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client(&server).current_user().await.unwrap();
        assert_eq!(user.email, "dev@example.com");
    }

    #[tokio::test]
    async fn invalid_token_fails_user_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/current"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).current_user().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn create_token_returns_new_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/cli_tokens"))
            .and(header(TOKEN_HEADER, "tok"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "ci-tok" })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).create_token().await.unwrap(), "ci-tok");
    }

    #[tokio::test]
    async fn targets_are_listed_and_resolved_by_nickname() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/targets"))
            .and(header(TOKEN_HEADER, "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "7f3a", "nickname": "marketing" },
                { "id": "9c1d", "nickname": "" },
                { "id": "b2e0" }
            ])))
            .mount(&server)
            .await;

        let control = client(&server);
        let targets = control.list_targets().await.unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].nickname.as_deref(), Some("marketing"));
        assert_eq!(targets[1].nickname, None);

        assert_eq!(control.resolve_target("marketing").await.unwrap().as_str(), "7f3a");
        assert_eq!(control.resolve_target("b2e0").await.unwrap().as_str(), "b2e0");
        let err = control.resolve_target("docs").await.unwrap_err();
        assert!(matches!(err, ApiError::UnknownTarget(ref name) if name == "docs"));
    }

    #[tokio::test]
    async fn register_returns_id_and_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/targets/site/deployments"))
            .and(header(TOKEN_HEADER, "tok"))
            .and(body_partial_json(json!({ "data": { "hash": "abc123" } })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "dep-1",
                "storage": { "zone": "site-zone", "access_key": "k3y" }
            })))
            .mount(&server)
            .await;

        let result = DeploymentResult::new(DeploymentInput::new("site"));
        let registration = client(&server)
            .register_deployment(
                &TargetId::new("site"),
                &SnapshotHash::new("abc123").unwrap(),
                &result,
            )
            .await
            .unwrap();

        assert_eq!(registration.id.as_str(), "dep-1");
        assert_eq!(registration.storage.zone.as_str(), "site-zone");
        assert_eq!(registration.storage.access_key, "k3y");
    }

    #[tokio::test]
    async fn describe_target_reads_storage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/targets/site"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "site",
                "storage": { "zone": "site-zone", "access_key": "k3y" }
            })))
            .mount(&server)
            .await;

        let storage = client(&server)
            .describe_target(&TargetId::new("site"))
            .await
            .unwrap();
        assert_eq!(storage.zone.as_str(), "site-zone");
    }

    #[tokio::test]
    async fn invalid_zone_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "storage": { "zone": "../etc", "access_key": "k3y" }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .describe_target(&TargetId::new("site"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server)
            .invalidate(&TargetId::new("site"), &["*".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn invalidate_sends_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/targets/site/invalidations"))
            .and(body_partial_json(json!({ "invalidation": { "pages": ["/", "/about"] } })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .invalidate(
                &TargetId::new("site"),
                &["/".to_string(), "/about".to_string()],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_patches_result_record() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/targets/site/deployments/dep-1"))
            .and(body_partial_json(json!({ "data": { "results": { "input": { "target": "site" } } } })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let result = DeploymentResult::new(DeploymentInput::new("site"));
        client(&server)
            .update_deployment(&TargetId::new("site"), &DeploymentId::new("dep-1"), &result)
            .await
            .unwrap();
    }
}

// ABOUTME: HTTP edge-storage backend for ObjectStore.
// ABOUTME: Authenticates with an AccessKey header and decodes JSON directory listings.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{ObjectEntry, ObjectStore, StoreError, directory_prefix};

/// Default storage API endpoint.
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.bunnycdn.com";

/// Object store reached over the edge-storage HTTP API.
///
/// Keys map directly onto URL paths below the endpoint; the first key
/// segment is the storage zone.
pub struct HttpStore {
    client: Client,
    endpoint: String,
    access_key: String,
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Listing entry as returned by the storage API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListingEntry {
    object_name: String,
    path: String,
    is_directory: bool,
    #[serde(default)]
    date_created: Option<NaiveDateTime>,
    #[serde(default)]
    length: u64,
}

impl From<ListingEntry> for ObjectEntry {
    fn from(entry: ListingEntry) -> Self {
        // The API reports paths with a leading slash ("/zone/dir/").
        let parent = directory_prefix(entry.path.trim_start_matches('/'));
        ObjectEntry {
            name: entry.object_name,
            parent,
            is_directory: entry.is_directory,
            created_at: entry.date_created.map(|d| d.and_utc()),
            length: entry.length,
        }
    }
}

impl HttpStore {
    /// Create a client for the given endpoint and access key.
    pub fn new(
        endpoint: &str,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_key: access_key.into(),
        })
    }

    /// Build the request URL for a key, percent-encoding each segment.
    fn url(&self, key: &str) -> String {
        let encoded: Vec<_> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.endpoint, encoded.join("/"))
    }

    async fn check(key: &str, response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StoreError::Unauthorized(key.to_string()))
            }
            _ => {
                let message = response.text().await.unwrap_or_else(|e| e.to_string());
                Err(StoreError::Http {
                    status: status.as_u16(),
                    key: key.to_string(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        let prefix = directory_prefix(prefix);
        let response = self
            .client
            .get(self.url(&prefix))
            .header("AccessKey", &self.access_key)
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = Self::check(&prefix, response).await?;

        let body = response.bytes().await?;
        let entries: Vec<ListingEntry> =
            serde_json::from_slice(&body).map_err(|e| StoreError::InvalidListing {
                key: prefix.clone(),
                message: e.to_string(),
            })?;

        Ok(entries.into_iter().map(ObjectEntry::from).collect())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let response = self
            .client
            .get(self.url(key))
            .header("AccessKey", &self.access_key)
            .send()
            .await?;
        let response = Self::check(key, response).await?;
        Ok(response.bytes().await?)
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(key))
            .header("AccessKey", &self.access_key)
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .send()
            .await?;
        Self::check(key, response).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(key))
            .header("AccessKey", &self.access_key)
            .send()
            .await?;
        Self::check(key, response).await?;
        Ok(())
    }
}

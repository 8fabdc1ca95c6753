// ABOUTME: Configuration types and parsing for stagehand.yml.
// ABOUTME: Handles file discovery, secrets from the environment, and target lookup.

mod deserialize;
mod env_value;
mod init;

pub use env_value::EnvValue;
pub use init::init_config;

use crate::api::DEFAULT_API_URL;
use crate::deploy::{DEFAULT_RETRY_DELAY, OBJECT_RETRIES, POINTER_RETRIES, RetryPolicies, RetryPolicy};
use crate::error::{Error, Result};
use crate::store::DEFAULT_STORAGE_ENDPOINT;
use crate::types::StorageRoot;
use deserialize::deserialize_storage_root;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "stagehand.yml";
pub const CONFIG_FILENAME_ALT: &str = "stagehand.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".stagehand/config.yml";

/// Environment variable consulted for the API token.
pub const TOKEN_ENV: &str = "STAGEHAND_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,

    #[serde(default)]
    pub token: Option<EnvValue>,

    #[serde(default = "default_api_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: None,
            timeout: default_api_timeout(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_storage_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_storage_endpoint(),
            timeout: default_storage_timeout(),
        }
    }
}

fn default_storage_endpoint() -> String {
    DEFAULT_STORAGE_ENDPOINT.to_string()
}

fn default_storage_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Retry budgets; `object` and `pointer` count retries after the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_object_retries")]
    pub object: u32,

    #[serde(default = "default_pointer_retries")]
    pub pointer: u32,

    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            object: OBJECT_RETRIES,
            pointer: POINTER_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

fn default_object_retries() -> u32 {
    OBJECT_RETRIES
}

fn default_pointer_retries() -> u32 {
    POINTER_RETRIES
}

fn default_retry_delay() -> Duration {
    DEFAULT_RETRY_DELAY
}

impl RetryConfig {
    pub fn policies(&self) -> RetryPolicies {
        RetryPolicies {
            object: RetryPolicy::new(self.object, self.delay),
            pointer: RetryPolicy::new(self.pointer, self.delay),
        }
    }
}

/// A target deployed with its own storage credentials, bypassing the
/// control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(deserialize_with = "deserialize_storage_root")]
    pub zone: StorageRoot,

    pub access_key: EnvValue,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but an absent file yields the defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.get(name)
    }

    /// API token, in order of precedence: command line, config file,
    /// `STAGEHAND_TOKEN`.
    pub fn api_token(&self, cli: Option<&str>) -> Result<Option<String>> {
        if let Some(token) = cli.filter(|t| !t.is_empty()) {
            return Ok(Some(token.to_string()));
        }

        if let Some(token) = &self.api.token {
            return token.resolve().map(Some);
        }

        Ok(std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()))
    }
}

// ABOUTME: Storage root naming and the remote namespace layout beneath it.
// ABOUTME: Maps snapshots, the live pointer, the live tree, and the error page to object keys.

use std::fmt;
use thiserror::Error;

use super::SnapshotHash;

/// Directory holding one subdirectory per snapshot hash.
pub const DEPLOYMENTS_DIR: &str = "__DEPLOYMENTS__";

/// Directory holding deployment metadata (the live pointer).
pub const DEPLOYMENTS_META_DIR: &str = "__DEPLOYMENTS_META__";

/// Name of the live pointer object inside the metadata directory.
pub const CURRENT_POINTER: &str = "current";

/// Conventional error-page alias served for unknown paths.
pub const ERROR_PAGE_ALIAS: &str = "errors/404.html";

/// Entry point whose swap makes a version visible.
pub const ENTRY_POINT: &str = "index.html";

/// Optional custom not-found page inside a build.
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Whether a live-tree relative path falls inside the engine's own
/// namespace (snapshots or deployment metadata) rather than the site.
pub fn is_reserved_path(relative: &str) -> bool {
    let first = relative
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    first == DEPLOYMENTS_DIR || first == DEPLOYMENTS_META_DIR
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageRootError {
    #[error("storage root cannot be empty")]
    Empty,

    #[error("invalid character in storage root: '{0}'")]
    InvalidChar(char),
}

/// Name of the remote root a target deploys into (one per environment).
///
/// Every object key the engine touches starts with `<root>/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageRoot(String);

impl StorageRoot {
    pub fn new(value: &str) -> Result<Self, StorageRootError> {
        let value = value.trim().trim_matches('/');
        if value.is_empty() {
            return Err(StorageRootError::Empty);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(StorageRootError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix under which all snapshots live, with trailing slash.
    pub fn deployments_prefix(&self) -> String {
        format!("{}/{}/", self.0, DEPLOYMENTS_DIR)
    }

    /// Prefix of one snapshot, with trailing slash.
    pub fn snapshot_prefix(&self, hash: &SnapshotHash) -> String {
        format!("{}{}/", self.deployments_prefix(), hash)
    }

    /// Key of a file inside a snapshot.
    pub fn snapshot_key(&self, hash: &SnapshotHash, relative: &str) -> String {
        format!("{}{}", self.snapshot_prefix(hash), relative.trim_start_matches('/'))
    }

    /// Key of the live pointer object.
    pub fn pointer_key(&self) -> String {
        format!("{}/{}/{}", self.0, DEPLOYMENTS_META_DIR, CURRENT_POINTER)
    }

    /// Key of a file in the live tree.
    pub fn live_key(&self, relative: &str) -> String {
        format!("{}/{}", self.0, relative.trim_start_matches('/'))
    }

    /// Key of the error-page alias.
    pub fn error_page_key(&self) -> String {
        self.live_key(ERROR_PAGE_ALIAS)
    }
}

impl fmt::Display for StorageRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

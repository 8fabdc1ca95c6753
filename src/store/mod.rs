// ABOUTME: Object storage capability the deployment engine is a client of.
// ABOUTME: Defines the ObjectStore trait plus HTTP and in-memory backends and recursive listing.

mod error;
mod http;
mod memory;
mod traverse;

pub use error::StoreError;
pub use http::{DEFAULT_STORAGE_ENDPOINT, HttpStore};
pub use memory::MemoryStore;
pub use traverse::list_files;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Primitive per-object operations offered by a storage backend.
///
/// Keys are `/`-separated and never start with a slash. A key ending in `/`
/// names a directory: `list` enumerates its direct children and `delete`
/// removes the whole subtree.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the direct children of a directory prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError>;

    /// Read an object's bytes.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Create or overwrite an object.
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError>;

    /// Delete an object, or a subtree when the key ends in `/`.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        (**self).list(prefix).await
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        (**self).put(key, body).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }
}

/// One child returned by [`ObjectStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Last path segment (no slashes).
    pub name: String,
    /// Directory the entry lives in, with trailing slash.
    pub parent: String,
    pub is_directory: bool,
    /// Assigned by the backend on first write, when it reports one.
    pub created_at: Option<DateTime<Utc>>,
    pub length: u64,
}

impl ObjectEntry {
    /// Full key of the entry; directories keep a trailing slash.
    pub fn key(&self) -> String {
        if self.is_directory {
            format!("{}{}/", self.parent, self.name)
        } else {
            format!("{}{}", self.parent, self.name)
        }
    }
}

/// Normalize a directory prefix so it ends with exactly one slash.
pub(crate) fn directory_prefix(prefix: &str) -> String {
    format!("{}/", prefix.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_key_marks_directories() {
        let dir = ObjectEntry {
            name: "assets".to_string(),
            parent: "zone/__DEPLOYMENTS__/abc/".to_string(),
            is_directory: true,
            created_at: None,
            length: 0,
        };
        assert_eq!(dir.key(), "zone/__DEPLOYMENTS__/abc/assets/");

        let file = ObjectEntry {
            is_directory: false,
            name: "app.js".to_string(),
            ..dir
        };
        assert_eq!(file.key(), "zone/__DEPLOYMENTS__/abc/app.js");
    }

    #[test]
    fn directory_prefix_normalizes_trailing_slash() {
        assert_eq!(directory_prefix("a/b"), "a/b/");
        assert_eq!(directory_prefix("a/b//"), "a/b/");
    }
}

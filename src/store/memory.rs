// ABOUTME: In-process ObjectStore backed by an ordered map.
// ABOUTME: Used for dry runs and tests; derives directory listings from key prefixes.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::{ObjectEntry, ObjectStore, StoreError, directory_prefix};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    created_at: DateTime<Utc>,
}

/// Object store held entirely in memory.
///
/// Directories are implicit: a directory exists while at least one key lives
/// beneath it. Listing a missing directory returns an empty list.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys currently stored, in order.
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().keys().cloned().collect()
    }

    /// Current bytes of an object, if present.
    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().get(key).map(|o| o.body.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Store an object with an explicit creation time.
    pub fn insert_at(&self, key: &str, body: impl Into<Bytes>, created_at: DateTime<Utc>) {
        self.objects.lock().insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                created_at,
            },
        );
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        let prefix = directory_prefix(prefix);
        let objects = self.objects.lock();

        let mut entries: BTreeMap<String, ObjectEntry> = BTreeMap::new();
        for (key, object) in objects.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };

            match rest.split_once('/') {
                Some((dir, _)) => {
                    let entry = entries.entry(dir.to_string()).or_insert_with(|| ObjectEntry {
                        name: dir.to_string(),
                        parent: prefix.clone(),
                        is_directory: true,
                        created_at: Some(object.created_at),
                        length: 0,
                    });
                    // A directory is as old as its oldest object.
                    if entry.created_at.is_none_or(|t| object.created_at < t) {
                        entry.created_at = Some(object.created_at);
                    }
                }
                None => {
                    entries.insert(
                        rest.to_string(),
                        ObjectEntry {
                            name: rest.to_string(),
                            parent: prefix.clone(),
                            is_directory: false,
                            created_at: Some(object.created_at),
                            length: object.body.len() as u64,
                        },
                    );
                }
            }
        }

        Ok(entries.into_values().collect())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.object(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        let mut objects = self.objects.lock();
        match objects.entry(key.to_string()) {
            Entry::Occupied(mut existing) => existing.get_mut().body = body,
            Entry::Vacant(slot) => {
                slot.insert(StoredObject {
                    body,
                    created_at: Utc::now(),
                });
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut objects = self.objects.lock();

        if key.ends_with('/') {
            let doomed: Vec<String> = objects
                .range(key.to_string()..)
                .take_while(|(k, _)| k.starts_with(key))
                .map(|(k, _)| k.clone())
                .collect();
            if doomed.is_empty() {
                return Err(StoreError::NotFound(key.to_string()));
            }
            for k in doomed {
                objects.remove(&k);
            }
            return Ok(());
        }

        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_returns_direct_children_only() {
        let store = MemoryStore::new();
        store.put("zone/a.txt", Bytes::from_static(b"a")).await.unwrap();
        store.put("zone/dir/b.txt", Bytes::from_static(b"b")).await.unwrap();
        store.put("zone/dir/deeper/c.txt", Bytes::from_static(b"c")).await.unwrap();
        store.put("zone2/other.txt", Bytes::from_static(b"x")).await.unwrap();

        let entries = store.list("zone").await.unwrap();
        let keys: Vec<_> = entries.iter().map(ObjectEntry::key).collect();
        assert_eq!(keys, vec!["zone/a.txt", "zone/dir/"]);
    }

    #[tokio::test]
    async fn list_of_missing_directory_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list("nothing/here/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overwrite_keeps_creation_time() {
        let store = MemoryStore::new();
        let created = Utc::now() - chrono::Duration::days(3);
        store.insert_at("zone/x", "old", created);

        store.put("zone/x", Bytes::from_static(b"new")).await.unwrap();

        let entries = store.list("zone/").await.unwrap();
        assert_eq!(entries[0].created_at, Some(created));
        assert_eq!(store.object("zone/x").unwrap(), Bytes::from_static(b"new"));
    }

    #[tokio::test]
    async fn delete_directory_removes_subtree() {
        let store = MemoryStore::new();
        store.put("zone/d/a", Bytes::from_static(b"a")).await.unwrap();
        store.put("zone/d/e/b", Bytes::from_static(b"b")).await.unwrap();
        store.put("zone/keep", Bytes::from_static(b"k")).await.unwrap();

        store.delete("zone/d/").await.unwrap();

        assert_eq!(store.keys(), vec!["zone/keep"]);
    }

    #[tokio::test]
    async fn delete_missing_reports_not_found() {
        let store = MemoryStore::new();
        assert!(store.delete("zone/d/").await.unwrap_err().is_not_found());
        assert!(store.delete("zone/file").await.unwrap_err().is_not_found());
    }
}

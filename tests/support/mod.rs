// ABOUTME: Test support utilities.
// ABOUTME: Provides a fault-injecting object store, remote seeding helpers, and build fixtures.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use stagehand::deploy::RetryPolicies;
use stagehand::store::{MemoryStore, ObjectEntry, ObjectStore, StoreError};
use stagehand::types::{SnapshotHash, StorageRoot};
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("stagehand=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const ZONE: &str = "zone";

#[allow(dead_code)]
pub fn root() -> StorageRoot {
    StorageRoot::new(ZONE).unwrap()
}

#[allow(dead_code)]
pub fn hash(value: &str) -> SnapshotHash {
    SnapshotHash::new(value).unwrap()
}

/// Default budgets without the pause between attempts.
#[allow(dead_code)]
pub fn no_delay() -> RetryPolicies {
    RetryPolicies::with_delay(Duration::ZERO)
}

/// Store `files` as the snapshot `hash` under [`ZONE`].
#[allow(dead_code)]
pub async fn seed_snapshot<S: ObjectStore + ?Sized>(store: &S, hash: &str, files: &[(&str, &str)]) {
    let root = root();
    let hash = SnapshotHash::new(hash).unwrap();
    for (relative, body) in files {
        store
            .put(
                &root.snapshot_key(&hash, relative),
                Bytes::from(body.to_string()),
            )
            .await
            .unwrap();
    }
}

/// Body of a live-tree object as a string, if present.
#[allow(dead_code)]
pub fn live(store: &MemoryStore, relative: &str) -> Option<String> {
    store
        .object(&root().live_key(relative))
        .map(|b| String::from_utf8_lossy(&b).into_owned())
}

/// Raw contents of the live pointer object.
#[allow(dead_code)]
pub fn pointer(store: &MemoryStore) -> Option<String> {
    store
        .object(&root().pointer_key())
        .map(|b| String::from_utf8_lossy(&b).into_owned())
}

/// Write a build directory containing `files`.
#[allow(dead_code)]
pub fn build_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, body) in files {
        write_file(dir.path(), relative, body);
    }
    dir
}

#[allow(dead_code)]
pub fn write_file(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, body).unwrap();
}

#[derive(Debug)]
struct Fault {
    key: String,
    remaining: usize,
}

/// [`MemoryStore`] wrapper that fails chosen writes and counts mutations.
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    faults: Mutex<Vec<Fault>>,
    puts: Mutex<Vec<String>>,
    deletes: Mutex<usize>,
}

#[allow(dead_code)]
impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` writes to `key`; later writes go through.
    pub fn fail_puts(&self, key: impl Into<String>, times: usize) {
        self.faults.lock().push(Fault {
            key: key.into(),
            remaining: times,
        });
    }

    /// Keys of every write attempt, failed ones included, in order.
    pub fn put_attempts(&self) -> Vec<String> {
        self.puts.lock().clone()
    }

    pub fn delete_count(&self) -> usize {
        *self.deletes.lock()
    }

    fn should_fail(&self, key: &str) -> bool {
        let mut faults = self.faults.lock();
        match faults
            .iter_mut()
            .find(|f| f.key == key && f.remaining > 0)
        {
            Some(fault) => {
                fault.remaining -= 1;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        self.inner.list(prefix).await
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        self.puts.lock().push(key.to_string());
        if self.should_fail(key) {
            return Err(StoreError::Http {
                status: 503,
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.inner.put(key, body).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        *self.deletes.lock() += 1;
        self.inner.delete(key).await
    }
}

// ABOUTME: Recursive listing of every file below a remote prefix.
// ABOUTME: Walks directories with an explicit work stack and returns a flat, sorted key list.

use super::{ObjectStore, StoreError, directory_prefix};

/// List the full keys of all files below `prefix`, at any depth.
///
/// The result is fully materialized so callers can check membership and
/// length before acting. A missing top-level prefix yields an empty list.
pub async fn list_files<S: ObjectStore + ?Sized>(
    store: &S,
    prefix: &str,
) -> Result<Vec<String>, StoreError> {
    let root = directory_prefix(prefix);
    let mut pending = vec![root.clone()];
    let mut files = Vec::new();

    while let Some(dir) = pending.pop() {
        let entries = match store.list(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() && dir == root => Vec::new(),
            Err(e) => return Err(e),
        };

        for entry in entries {
            if entry.is_directory {
                pending.push(entry.key());
            } else {
                files.push(entry.key());
            }
        }
    }

    tracing::debug!("Listed {} file(s) under {}", files.len(), root);
    files.sort();
    Ok(files)
}

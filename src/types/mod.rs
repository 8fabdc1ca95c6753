// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Snapshot hashes, storage roots with their key layout, and phantom-typed IDs.

mod id;
mod snapshot_hash;
mod storage_root;

pub use id::{DeploymentId, TargetId};
pub use snapshot_hash::{SnapshotHash, SnapshotHashError};
pub use storage_root::{
    CURRENT_POINTER, DEPLOYMENTS_DIR, DEPLOYMENTS_META_DIR, ENTRY_POINT, ERROR_PAGE_ALIAS,
    NOT_FOUND_PAGE, StorageRoot, StorageRootError, is_reserved_path,
};

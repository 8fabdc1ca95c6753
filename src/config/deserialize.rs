// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates storage zone names while parsing.

use serde::Deserialize;

use crate::types::StorageRoot;

pub fn deserialize_storage_root<'de, D>(deserializer: D) -> Result<StorageRoot, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    StorageRoot::new(&s).map_err(serde::de::Error::custom)
}

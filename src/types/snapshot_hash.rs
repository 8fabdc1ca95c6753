// ABOUTME: Validated content hash naming an immutable snapshot.
// ABOUTME: Accepts the "v.<hash>" spelling used on the command line.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix users may put in front of a version when naming it.
const VERSION_PREFIX: &str = "v.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotHashError {
    #[error("snapshot hash cannot be empty")]
    Empty,

    #[error("snapshot hash exceeds maximum length of 128 characters")]
    TooLong,

    #[error("invalid character in snapshot hash: '{0}'")]
    InvalidChar(char),
}

/// Content hash of a build, used as the snapshot's directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotHash(String);

impl SnapshotHash {
    pub fn new(value: &str) -> Result<Self, SnapshotHashError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SnapshotHashError::Empty);
        }

        if value.len() > 128 {
            return Err(SnapshotHashError::TooLong);
        }

        // The hash becomes a path segment, so separators and dots are out.
        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
                return Err(SnapshotHashError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Parse a user-supplied version such as `v.3fa1c0` or `3fa1c0`.
    pub fn parse_version(value: &str) -> Result<Self, SnapshotHashError> {
        let value = value.trim();
        Self::new(value.strip_prefix(VERSION_PREFIX).unwrap_or(value))
    }

    /// Wrap a hex digest, which is always a valid hash.
    pub(crate) fn from_digest(hex: String) -> Self {
        debug_assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-facing label, e.g. `v.3fa1c0`.
    pub fn version_label(&self) -> String {
        format!("{VERSION_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SnapshotHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SnapshotHash {
    type Err = SnapshotHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_version(s)
    }
}

impl Serialize for SnapshotHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SnapshotHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(&value).map_err(serde::de::Error::custom)
    }
}

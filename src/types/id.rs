// ABOUTME: Phantom-typed identifiers for control-plane records.
// ABOUTME: Keeps deployment IDs and target IDs from being swapped at call sites.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Kind of record an [`Id`] refers to.
pub trait IdKind {
    /// Name used in `Debug` output.
    const LABEL: &'static str;
}

pub enum DeploymentMarker {}
pub enum TargetMarker {}

impl IdKind for DeploymentMarker {
    const LABEL: &'static str = "DeploymentId";
}

impl IdKind for TargetMarker {
    const LABEL: &'static str = "TargetId";
}

/// An opaque identifier issued or accepted by the control plane.
///
/// The value is never interpreted locally; it only travels in URL paths and
/// result records.
#[must_use = "IDs reference remote records and should not be ignored"]
pub struct Id<K> {
    value: String,
    _kind: PhantomData<K>,
}

impl<K> Id<K> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The value percent-encoded for use as a single URL path segment.
    pub fn url_segment(&self) -> Cow<'_, str> {
        urlencoding::encode(&self.value)
    }
}

// Manual impls so `K` needs no bounds.

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::LABEL, self.value)
    }
}

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> Eq for Id<K> {}

impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, K> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Opaque id the control plane assigns to one deployment attempt.
pub type DeploymentId = Id<DeploymentMarker>;

/// Control-plane id (or configured name) of a deploy target.
pub type TargetId = Id<TargetMarker>;

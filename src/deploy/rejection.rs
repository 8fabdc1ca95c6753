// ABOUTME: Validation rejections with stable reason strings.
// ABOUTME: Outcome wraps a completed operation or the reason it was refused.

use serde::{Serialize, Serializer};
use std::fmt;

/// A request refused by validation before (or instead of) mutating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The build or snapshot has no `index.html`.
    NoIndex,
    /// The build root has a `package.json`, so it is likely a source tree.
    HasPackageJson,
    /// The build has files inside the snapshot or metadata namespace.
    ReservedPath,
    /// The snapshot namespace holds no files.
    NoFiles,
    /// Flushing the live version was requested.
    FlushCurrentVersion,
    /// The snapshot to flush does not exist.
    VersionNotFound,
}

impl Rejection {
    /// Stable machine-readable reason, as recorded in deployment results.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::NoIndex => "deployment.no_index",
            Rejection::HasPackageJson => "deployment.has_package_json",
            Rejection::ReservedPath => "deployment.reserved_path",
            Rejection::NoFiles => "deployment.no_files",
            Rejection::FlushCurrentVersion => "flush.attempting_flush_current_version",
            Rejection::VersionNotFound => "flush.version_not_found",
        }
    }

    /// Explanation for humans.
    pub fn describe(&self) -> &'static str {
        match self {
            Rejection::NoIndex => "no index.html found at the root of the build",
            Rejection::HasPackageJson => {
                "package.json found at the build root; point at the build output, not the source tree"
            }
            Rejection::ReservedPath => {
                "the build contains __DEPLOYMENTS__ or __DEPLOYMENTS_META__ at its root"
            }
            Rejection::NoFiles => "the snapshot contains no files",
            Rejection::FlushCurrentVersion => "refusing to flush the version that is currently live",
            Rejection::VersionNotFound => "no snapshot with that version exists",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.describe(), self.reason())
    }
}

impl Serialize for Rejection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.reason())
    }
}

/// Result of an operation that validation may refuse.
#[must_use = "a rejected operation must be reported"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Done(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Rejected(r) => Some(*r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Rejected(r) => Outcome::Rejected(r),
        }
    }
}

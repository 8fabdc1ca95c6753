// ABOUTME: Promotion state marker types for the type state pattern.
// ABOUTME: Also names the activation phases used in logs, errors, and reports.

use std::fmt;

/// Initial state: target chosen, snapshot not yet inspected.
/// Available actions: `validate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// Snapshot traversed and found to contain an entry point.
/// Available actions: `promote_files()`
#[derive(Debug, Clone)]
pub struct Validated {
    /// Paths relative to the snapshot base.
    pub(crate) files: Vec<String>,
}

/// Every file except the entry point copied into the live tree.
/// Available actions: `alias_error_page()`
#[derive(Debug, Clone, Copy)]
pub struct FilesPromoted {
    pub(crate) has_not_found_page: bool,
}

/// Error-page alias written.
/// Available actions: `publish_entry()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPageAliased;

/// Entry point swapped; the new version is what users see.
/// Available actions: `record_pointer()`
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryPublished;

/// Live pointer written. Terminal.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Recorded;

/// Phases of an activation, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ReadingCurrent,
    ValidatingSnapshot,
    PromotingFiles,
    AliasingErrorPage,
    PublishingEntry,
    RecordingPointer,
    Done,
    RollingBack,
    RollbackFailed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ReadingCurrent => "reading-current",
            Phase::ValidatingSnapshot => "validating-snapshot",
            Phase::PromotingFiles => "promoting-files",
            Phase::AliasingErrorPage => "aliasing-error-page",
            Phase::PublishingEntry => "publishing-entry",
            Phase::RecordingPointer => "recording-pointer",
            Phase::Done => "done",
            Phase::RollingBack => "rolling-back",
            Phase::RollbackFailed => "rollback-failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

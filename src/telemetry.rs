// ABOUTME: Telemetry seam for failure capture and lifecycle breadcrumbs.
// ABOUTME: Default sink forwards to tracing; the recording sink keeps events for inspection.

use parking_lot::Mutex;
use std::fmt;

/// Severity of a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// Lifecycle markers emitted around remote mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breadcrumb {
    WillRegisterDeployment,
    DidRegisterDeployment,
    WillDeployVersion,
    DidDeployVersion,
    DeployVersionDidFail,
    WillActivateVersion,
    DidActivateVersion,
    ActivateVersionDidFail,
    WillRollbackVersion,
    DidRollbackVersion,
    RollbackVersionDidFail,
    RollbackVersionDidCriticallyFail,
    WillFlushVersion,
    DidFlushVersion,
}

impl Breadcrumb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Breadcrumb::WillRegisterDeployment => "WILL_REGISTER_DEPLOYMENT_WITH_SERVER",
            Breadcrumb::DidRegisterDeployment => "DID_REGISTER_DEPLOYMENT_WITH_SERVER",
            Breadcrumb::WillDeployVersion => "WILL_DEPLOY_VERSION",
            Breadcrumb::DidDeployVersion => "DID_DEPLOY_VERSION",
            Breadcrumb::DeployVersionDidFail => "DEPLOY_VERSION_DID_FAIL",
            Breadcrumb::WillActivateVersion => "WILL_ACTIVATE_VERSION",
            Breadcrumb::DidActivateVersion => "DID_ACTIVATE_VERSION",
            Breadcrumb::ActivateVersionDidFail => "ACTIVATE_VERSION_DID_FAIL",
            Breadcrumb::WillRollbackVersion => "WILL_ROLLBACK_VERSION",
            Breadcrumb::DidRollbackVersion => "DID_ROLLBACK_VERSION",
            Breadcrumb::RollbackVersionDidFail => "ROLLBACK_VERSION_DID_FAIL",
            Breadcrumb::RollbackVersionDidCriticallyFail => "ROLLBACK_VERSION_DID_CRITICALLY_FAIL",
            Breadcrumb::WillFlushVersion => "WILL_FLUSH_VERSION",
            Breadcrumb::DidFlushVersion => "DID_FLUSH_VERSION",
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Breadcrumb::DeployVersionDidFail
            | Breadcrumb::ActivateVersionDidFail
            | Breadcrumb::RollbackVersionDidFail => Level::Warning,
            Breadcrumb::RollbackVersionDidCriticallyFail => Level::Error,
            _ => Level::Info,
        }
    }
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External collector for failures and breadcrumbs.
pub trait Telemetry: Send + Sync {
    /// Report a failure that was handled (typically a retried attempt).
    fn capture(&self, error: &dyn std::error::Error);

    /// Record a lifecycle marker.
    fn breadcrumb(&self, crumb: Breadcrumb);
}

/// Telemetry sink that only logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn capture(&self, error: &dyn std::error::Error) {
        tracing::warn!(error = %error, "captured failure");
    }

    fn breadcrumb(&self, crumb: Breadcrumb) {
        match crumb.level() {
            Level::Info => tracing::debug!("{crumb}"),
            Level::Warning => tracing::warn!("{crumb}"),
            Level::Error => tracing::error!("{crumb}"),
        }
    }
}

/// Telemetry sink that keeps everything it receives.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    captured: Mutex<Vec<String>>,
    breadcrumbs: Mutex<Vec<Breadcrumb>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of all captured failures, oldest first.
    pub fn captured(&self) -> Vec<String> {
        self.captured.lock().clone()
    }

    /// Breadcrumbs in emission order.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.breadcrumbs.lock().clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn capture(&self, error: &dyn std::error::Error) {
        self.captured.lock().push(error.to_string());
    }

    fn breadcrumb(&self, crumb: Breadcrumb) {
        self.breadcrumbs.lock().push(crumb);
    }
}

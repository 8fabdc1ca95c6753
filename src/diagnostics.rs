// ABOUTME: Diagnostics accumulator for non-fatal warnings during a command.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during deployment operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a command.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Activation failed but the previous version was restored.
    pub fn rolled_back(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RolledBack,
            message: message.into(),
        }
    }

    /// The control plane did not accept the final result record.
    pub fn result_not_recorded(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ResultNotRecorded,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Activation failed and was undone by a rollback.
    RolledBack,
    /// Submitting the deployment result to the control plane failed.
    ResultNotRecorded,
}

//! Error types for the plugin protocol layer.
//!
//! Two kinds of failure live here. [`PluginError`] covers everything that
//! goes wrong *talking to the region*: the segment cannot be opened, a
//! value fails validation before encoding, or the cross-process lock is
//! not acquired in time. [`PhaseFailure`] is what plugin hooks return to
//! report that a work phase itself went wrong; the lifecycle controller
//! turns it into an error-state publication and decides whether the run
//! continues.

use std::time::Duration;

use burnin::plugin::ErrorSeverity;
use burnin_shared_memory::{LockError, ShmError};
use thiserror::Error;

/// Errors raised by the typed interface and connection handling.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The shared-memory region could not be opened or accessed.
    ///
    /// Connection failures are fatal for the lifecycle: they are never
    /// retried and the controller never starts when one occurs.
    #[error("Shared memory connection failed: {source}")]
    Connection {
        /// Underlying transport error.
        #[from]
        source: ShmError,
    },

    /// A value was rejected before being encoded into the region.
    ///
    /// Validation failures are local to the caller and never alter the
    /// published error state.
    #[error("Invalid value for {field}: {reason}")]
    Validation {
        /// Interface field the value was destined for.
        field: &'static str,
        /// Human-readable rejection reason.
        reason: String,
    },

    /// The cross-process lock was not acquired within its timeout.
    ///
    /// The controller treats this as a critical failure of the current
    /// phase.
    #[error("Region lock unavailable: {source}")]
    LockTimeout {
        /// Outcome reported by the lock.
        #[from]
        source: LockError,
    },
}

/// Result alias for interface operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// A failed work phase, as reported by a plugin hook.
///
/// Carries the message and severity that will be latched into the shared
/// error state, plus an optional longer detail text. The severity defaults
/// to [`ErrorSeverity::Serious`], which reports the failure without ending
/// the run; severities at [`ErrorSeverity::Critical`] and above make the
/// controller move to cleanup.
///
/// ```
/// use burnin::plugin::ErrorSeverity;
/// use burnin_plugin::PhaseFailure;
///
/// let failure = PhaseFailure::new("target file vanished")
///     .with_severity(ErrorSeverity::Critical)
///     .with_detail("expected /mnt/scratch/burnin.dat to survive the cycle");
/// assert!(failure.severity.stops_run());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PhaseFailure {
    /// Short description, truncated to the region's message field on publish.
    pub message: String,
    /// How bad it was.
    pub severity: ErrorSeverity,
    /// Optional longer description for the region's detail field.
    pub detail: Option<String>,
}

impl PhaseFailure {
    /// New failure with the default severity.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: ErrorSeverity::Serious,
            detail: None,
        }
    }

    /// New failure that ends the run.
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(ErrorSeverity::Critical)
    }

    /// Override the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach a longer detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Whether the controller should enter cleanup after this failure.
    #[inline]
    pub fn stops_run(&self) -> bool {
        self.severity.stops_run()
    }
}

impl PluginError {
    /// Timeout the lock acquisition waited, if this is a lock failure.
    pub fn lock_wait(&self) -> Option<Duration> {
        match self {
            Self::LockTimeout {
                source: LockError::Timeout { waited },
            } => Some(*waited),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_failure_defaults_to_serious() {
        let failure = PhaseFailure::new("short write");
        assert_eq!(failure.severity, ErrorSeverity::Serious);
        assert!(failure.detail.is_none());
        assert!(!failure.stops_run());
    }

    #[test]
    fn phase_failure_builder_chains() {
        let failure = PhaseFailure::new("checksum mismatch")
            .with_severity(ErrorSeverity::Terminal)
            .with_detail("block 77 read back as zeros");
        assert!(failure.stops_run());
        assert_eq!(failure.detail.as_deref(), Some("block 77 read back as zeros"));
        assert_eq!(format!("{failure}"), "checksum mismatch");
    }

    #[test]
    fn lock_timeout_reports_wait() {
        let err = PluginError::from(LockError::Timeout {
            waited: Duration::from_millis(250),
        });
        assert_eq!(err.lock_wait(), Some(Duration::from_millis(250)));

        let err = PluginError::Validation {
            field: "duty_cycle",
            reason: "out of range".into(),
        };
        assert_eq!(err.lock_wait(), None);
    }

    #[test]
    fn connection_error_wraps_transport() {
        let err = PluginError::from(ShmError::BadMagic);
        assert!(matches!(err, PluginError::Connection { .. }));
        assert!(format!("{err}").contains("connection failed"));
    }
}

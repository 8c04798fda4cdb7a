//! Severity-precedence rules for the shared error state.
//!
//! The region holds a single latched error: message, severity, running
//! count, and an optional longer detail. An incoming report only replaces
//! the latched one when its severity is at least as high; equal severity
//! refreshes the message so the newest context wins. Reports below the
//! latched severity are still counted, but the visible severity never
//! moves backwards. [`ErrorSeverity::Terminal`] therefore sticks until an
//! explicit [`clear`](crate::PluginInterface::clear_error).

use burnin::plugin::ErrorSeverity;
use serde::{Deserialize, Serialize};

/// Whether an incoming report replaces the latched error state.
#[inline]
pub fn should_latch(current: ErrorSeverity, incoming: ErrorSeverity) -> bool {
    incoming >= current
}

/// Snapshot of the latched error state as read from the region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Latched message text.
    pub message: String,
    /// Latched severity.
    pub severity: ErrorSeverity,
    /// Longer detail text, empty when none was supplied.
    pub detail: String,
    /// Reports made since the run began, including non-latched ones.
    pub count: u32,
}

impl ErrorReport {
    /// Whether an error is currently latched. The count is cumulative and
    /// survives [`clear_error`](crate::PluginInterface::clear_error), so it
    /// does not participate here.
    pub fn is_set(&self) -> bool {
        self.severity != ErrorSeverity::None
    }
}

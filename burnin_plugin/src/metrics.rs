//! Per-phase operation and error counters.
//!
//! The region keeps six 64-bit counters: operations and errors for each of
//! the write, read, and verify phases. Plugins report them either as
//! absolute totals ([`MetricsUpdate`]) or as deltas accumulated under the
//! region lock ([`MetricsDelta`]). [`MetricsSnapshot`] is the read side.

use serde::{Deserialize, Serialize};

/// Absolute counter values to publish.
///
/// Fields left as `None` keep their current value in the region. Useful
/// when the plugin tracks totals itself and pushes them wholesale:
///
/// ```
/// use burnin_plugin::MetricsUpdate;
///
/// let update = MetricsUpdate {
///     write_ops: Some(4096),
///     write_errors: Some(0),
///     ..Default::default()
/// };
/// assert!(update.read_ops.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsUpdate {
    /// Total write operations, if changed.
    pub write_ops: Option<u64>,
    /// Total read operations, if changed.
    pub read_ops: Option<u64>,
    /// Total verify operations, if changed.
    pub verify_ops: Option<u64>,
    /// Total write errors, if changed.
    pub write_errors: Option<u64>,
    /// Total read errors, if changed.
    pub read_errors: Option<u64>,
    /// Total verify errors, if changed.
    pub verify_errors: Option<u64>,
}

/// Counter increments to apply on top of the current region values.
///
/// Zero fields are skipped, so `MetricsDelta { write_ops: 8, ..Default::default() }`
/// touches exactly one counter. Additions saturate instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsDelta {
    /// Write operations completed since the last report.
    pub write_ops: u64,
    /// Read operations completed since the last report.
    pub read_ops: u64,
    /// Verify operations completed since the last report.
    pub verify_ops: u64,
    /// Write errors observed since the last report.
    pub write_errors: u64,
    /// Read errors observed since the last report.
    pub read_errors: u64,
    /// Verify errors observed since the last report.
    pub verify_errors: u64,
}

impl MetricsDelta {
    /// A delta that touches nothing.
    pub const fn empty() -> Self {
        Self {
            write_ops: 0,
            read_ops: 0,
            verify_ops: 0,
            write_errors: 0,
            read_errors: 0,
            verify_errors: 0,
        }
    }

    /// Whether every field is zero.
    pub const fn is_empty(&self) -> bool {
        self.write_ops == 0
            && self.read_ops == 0
            && self.verify_ops == 0
            && self.write_errors == 0
            && self.read_errors == 0
            && self.verify_errors == 0
    }
}

/// Point-in-time copy of the published counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total write operations.
    pub write_ops: u64,
    /// Total read operations.
    pub read_ops: u64,
    /// Total verify operations.
    pub verify_ops: u64,
    /// Total write errors.
    pub write_errors: u64,
    /// Total read errors.
    pub read_errors: u64,
    /// Total verify errors.
    pub verify_errors: u64,
    /// Times the error state was set since the run began.
    pub error_count: u32,
}

impl MetricsSnapshot {
    /// Apply a delta to this snapshot, saturating on overflow.
    #[must_use]
    pub fn apply(mut self, delta: &MetricsDelta) -> Self {
        self.write_ops = self.write_ops.saturating_add(delta.write_ops);
        self.read_ops = self.read_ops.saturating_add(delta.read_ops);
        self.verify_ops = self.verify_ops.saturating_add(delta.verify_ops);
        self.write_errors = self.write_errors.saturating_add(delta.write_errors);
        self.read_errors = self.read_errors.saturating_add(delta.read_errors);
        self.verify_errors = self.verify_errors.saturating_add(delta.verify_errors);
        self
    }
}

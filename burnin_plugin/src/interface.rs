//! Typed façade over the interface region.
//!
//! Every setter validates its input, acquires the cross-process lock,
//! writes the field (plus any companion fields and notification flags)
//! and releases the lock before returning. Nothing is cached on the
//! plugin side: a value passed to a setter is visible to the harness by
//! the time the call returns, and getters always read the region as it
//! is now.
//!
//! String values are sanitized and truncated to their field capacity
//! rather than rejected; numeric inputs outside their range are a
//! [`PluginError::Validation`], which never touches the shared error
//! state.

use std::time::Duration;

use burnin::plugin::{ErrorSeverity, InterfaceFlags, StatusCode};
use burnin::shm::consts::{
    INTERFACE_VERSION, MAX_DISPLAY_TEXT, MAX_ERROR_TEXT, MAX_ERROR_TEXT_LONG, USER_FIELD_SLOTS,
};
use burnin::shm::layout::{offsets, slot, user_field_offset};
use burnin_shared_memory::{CrossProcessLock, LockGuard, SharedSegment};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PluginConfig;
use crate::connection::PluginConnection;
use crate::error::{PluginError, PluginResult};
use crate::error_state::{ErrorReport, should_latch};
use crate::metrics::{MetricsDelta, MetricsSnapshot, MetricsUpdate};

/// A user-defined display field slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserField {
    /// Slot id, `1..=USER_FIELD_SLOTS`.
    pub id: u32,
    /// Display label.
    pub label: String,
    /// Display value.
    pub value: String,
    /// Whether the harness shows the slot.
    pub enabled: bool,
}

pub(crate) fn acquire<'a>(
    lock: &'a CrossProcessLock,
    timeout: Duration,
) -> PluginResult<LockGuard<'a>> {
    Ok(lock.acquire(timeout)?)
}

pub(crate) fn read_flags(segment: &SharedSegment) -> PluginResult<InterfaceFlags> {
    Ok(InterfaceFlags::from_bits_truncate(
        segment.read_u32(offsets::FLAGS)?,
    ))
}

pub(crate) fn raise_flags(segment: &mut SharedSegment, set: InterfaceFlags) -> PluginResult<()> {
    let bits = segment.read_u32(offsets::FLAGS)?;
    segment.write_u32(offsets::FLAGS, bits | set.bits())?;
    Ok(())
}

pub(crate) fn clear_flags(segment: &mut SharedSegment, clear: InterfaceFlags) -> PluginResult<()> {
    let bits = segment.read_u32(offsets::FLAGS)?;
    segment.write_u32(offsets::FLAGS, bits & !clear.bits())?;
    Ok(())
}

/// Slot index for a user-field id, or `None` when the id is out of range.
pub(crate) fn slot_index(id: u32) -> Option<usize> {
    if (1..=USER_FIELD_SLOTS as u32).contains(&id) {
        Some((id - 1) as usize)
    } else {
        None
    }
}

pub(crate) fn read_slot(segment: &SharedSegment, id: u32) -> PluginResult<Option<UserField>> {
    let Some(index) = slot_index(id) else {
        return Ok(None);
    };
    let base = user_field_offset(index);
    if segment.read_u32(base + slot::ID)? != id {
        return Ok(None);
    }
    Ok(Some(UserField {
        id,
        label: segment.read_string(base + slot::LABEL, MAX_DISPLAY_TEXT)?,
        value: segment.read_string(base + slot::VALUE, MAX_DISPLAY_TEXT)?,
        enabled: segment.read_bytes(base + slot::ENABLED, 1)?[0] != 0,
    }))
}

fn write_slot(
    segment: &mut SharedSegment,
    id: u32,
    label: &str,
    value: &str,
    enabled: bool,
) -> PluginResult<()> {
    let base = user_field_offset((id - 1) as usize);
    segment.write_u32(base + slot::ID, id)?;
    segment.write_bytes(base + slot::ENABLED, &[u8::from(enabled)])?;
    segment.write_string(base + slot::LABEL, MAX_DISPLAY_TEXT, label)?;
    segment.write_string(base + slot::VALUE, MAX_DISPLAY_TEXT, value)?;
    Ok(())
}

pub(crate) fn read_metrics(segment: &SharedSegment) -> PluginResult<MetricsSnapshot> {
    Ok(MetricsSnapshot {
        write_ops: segment.read_u64(offsets::WRITE_OPS)?,
        read_ops: segment.read_u64(offsets::READ_OPS)?,
        verify_ops: segment.read_u64(offsets::VERIFY_OPS)?,
        write_errors: segment.read_u64(offsets::WRITE_ERRORS)?,
        read_errors: segment.read_u64(offsets::READ_ERRORS)?,
        verify_errors: segment.read_u64(offsets::VERIFY_ERRORS)?,
        error_count: segment.read_u32(offsets::ERROR_COUNT)?,
    })
}

pub(crate) fn read_error(segment: &SharedSegment) -> PluginResult<ErrorReport> {
    Ok(ErrorReport {
        message: segment.read_string(offsets::ERROR_MESSAGE, MAX_ERROR_TEXT)?,
        severity: ErrorSeverity::from_u32(segment.read_u32(offsets::ERROR_SEVERITY)?)
            .unwrap_or_default(),
        detail: segment.read_string(offsets::ERROR_DETAIL, MAX_ERROR_TEXT_LONG)?,
        count: segment.read_u32(offsets::ERROR_COUNT)?,
    })
}

/// The plugin's typed view of the interface region.
///
/// Constructed from a [`PluginConnection`]; construction publishes the
/// initial field values (labels, starter status, the two default user
/// fields) so the harness has something to display before the first
/// cycle.
pub struct PluginInterface {
    segment: SharedSegment,
    lock: CrossProcessLock,
    lock_timeout: Duration,
}

impl PluginInterface {
    /// Attach to region `name` and initialize it in one step.
    pub fn connect(name: &str, config: &PluginConfig) -> PluginResult<Self> {
        let connection = PluginConnection::open(name, config.lifecycle.lock_timeout())?;
        Self::new(connection, config)
    }

    /// Wrap an open connection and publish the initial field values.
    pub fn new(connection: PluginConnection, config: &PluginConfig) -> PluginResult<Self> {
        let mut iface = Self {
            segment: connection.segment,
            lock: connection.lock,
            lock_timeout: config.lifecycle.lock_timeout(),
        };
        iface.initialize(config)?;
        Ok(iface)
    }

    fn initialize(&mut self, config: &PluginConfig) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment
            .write_u32(offsets::INTERFACE_VERSION, INTERFACE_VERSION)?;
        self.segment
            .write_string(offsets::WINDOW_TITLE, MAX_DISPLAY_TEXT, config.window_title())?;
        self.segment
            .write_string(offsets::WRITE_LABEL, MAX_DISPLAY_TEXT, &config.labels.write)?;
        self.segment
            .write_string(offsets::READ_LABEL, MAX_DISPLAY_TEXT, &config.labels.read)?;
        self.segment
            .write_string(offsets::VERIFY_LABEL, MAX_DISPLAY_TEXT, &config.labels.verify)?;
        self.segment
            .write_string(offsets::STATUS_TEXT, MAX_DISPLAY_TEXT, "Initializing")?;
        self.segment
            .write_u32(offsets::STATUS_CODE, StatusCode::Startup as u32)?;
        write_slot(&mut self.segment, 1, "Custom Field 1", "Ready", true)?;
        write_slot(&mut self.segment, 2, "Custom Field 2", "Ready", true)?;
        raise_flags(
            &mut self.segment,
            InterfaceFlags::DISPLAY_TEXT_SET
                | InterfaceFlags::NEW_STATUS
                | InterfaceFlags::NEW_USER_VALUE_1
                | InterfaceFlags::NEW_USER_VALUE_2,
        )?;
        debug!(segment = self.segment.name(), "interface initialized");
        Ok(())
    }

    /// Name of the attached segment.
    pub fn segment_name(&self) -> &str {
        self.segment.name()
    }

    // ─── Harness inputs ─────────────────────────────────────────────

    /// Whether the harness wants tests running.
    pub fn test_running(&self) -> PluginResult<bool> {
        Ok(self.segment.read_u32(offsets::TEST_RUNNING)? != 0)
    }

    /// Duty cycle percentage requested by the harness, 0-100.
    pub fn duty_cycle(&self) -> PluginResult<u32> {
        Ok(self.segment.read_u32(offsets::DUTY_CYCLE)?)
    }

    // ─── Status ─────────────────────────────────────────────────────

    /// Interface version echoed in the region body.
    pub fn interface_version(&self) -> PluginResult<u32> {
        Ok(self.segment.read_u32(offsets::INTERFACE_VERSION)?)
    }

    /// Current cycle number as published.
    pub fn cycle(&self) -> PluginResult<u32> {
        Ok(self.segment.read_u32(offsets::CYCLE)?)
    }

    /// Current status code; unknown raw values read as `NoStatus`.
    pub fn status_code(&self) -> PluginResult<StatusCode> {
        Ok(StatusCode::from_u32(self.segment.read_u32(offsets::STATUS_CODE)?).unwrap_or_default())
    }

    /// Current status text.
    pub fn status_text(&self) -> PluginResult<String> {
        self.segment
            .read_string(offsets::STATUS_TEXT, MAX_DISPLAY_TEXT)
            .map_err(PluginError::from)
    }

    /// Current notification and level flags.
    pub fn flags(&self) -> PluginResult<InterfaceFlags> {
        read_flags(&self.segment)
    }

    /// Publish a status code and text together and raise the status
    /// notification.
    pub fn set_status(&mut self, code: StatusCode, text: &str) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment.write_u32(offsets::STATUS_CODE, code as u32)?;
        self.segment
            .write_string(offsets::STATUS_TEXT, MAX_DISPLAY_TEXT, text)?;
        raise_flags(&mut self.segment, InterfaceFlags::NEW_STATUS)
    }

    /// Publish the current cycle number.
    pub fn set_cycle(&mut self, cycle: u32) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment.write_u32(offsets::CYCLE, cycle)?;
        Ok(())
    }

    /// Publish a new window title.
    pub fn set_window_title(&mut self, title: &str) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment
            .write_string(offsets::WINDOW_TITLE, MAX_DISPLAY_TEXT, title)?;
        raise_flags(&mut self.segment, InterfaceFlags::DISPLAY_TEXT_SET)
    }

    /// Publish the three operation labels together.
    pub fn set_labels(&mut self, write: &str, read: &str, verify: &str) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment
            .write_string(offsets::WRITE_LABEL, MAX_DISPLAY_TEXT, write)?;
        self.segment
            .write_string(offsets::READ_LABEL, MAX_DISPLAY_TEXT, read)?;
        self.segment
            .write_string(offsets::VERIFY_LABEL, MAX_DISPLAY_TEXT, verify)?;
        raise_flags(&mut self.segment, InterfaceFlags::DISPLAY_TEXT_SET)
    }

    // ─── Metrics ────────────────────────────────────────────────────

    /// Read all published counters.
    pub fn metrics(&self) -> PluginResult<MetricsSnapshot> {
        read_metrics(&self.segment)
    }

    /// Publish absolute counter values; `None` fields keep their current
    /// value.
    pub fn update_metrics(&mut self, update: &MetricsUpdate) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        let fields = [
            (offsets::WRITE_OPS, update.write_ops),
            (offsets::READ_OPS, update.read_ops),
            (offsets::VERIFY_OPS, update.verify_ops),
            (offsets::WRITE_ERRORS, update.write_errors),
            (offsets::READ_ERRORS, update.read_errors),
            (offsets::VERIFY_ERRORS, update.verify_errors),
        ];
        for (offset, value) in fields {
            if let Some(value) = value {
                self.segment.write_u64(offset, value)?;
            }
        }
        Ok(())
    }

    /// Add deltas to the published counters under a single lock
    /// acquisition, saturating on overflow.
    pub fn increment_metrics(&mut self, delta: &MetricsDelta) -> PluginResult<()> {
        if delta.is_empty() {
            return Ok(());
        }
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        let fields = [
            (offsets::WRITE_OPS, delta.write_ops),
            (offsets::READ_OPS, delta.read_ops),
            (offsets::VERIFY_OPS, delta.verify_ops),
            (offsets::WRITE_ERRORS, delta.write_errors),
            (offsets::READ_ERRORS, delta.read_errors),
            (offsets::VERIFY_ERRORS, delta.verify_errors),
        ];
        for (offset, add) in fields {
            if add > 0 {
                let current = self.segment.read_u64(offset)?;
                self.segment.write_u64(offset, current.saturating_add(add))?;
            }
        }
        Ok(())
    }

    // ─── Error state ────────────────────────────────────────────────

    /// Read the latched error state.
    pub fn error(&self) -> PluginResult<ErrorReport> {
        read_error(&self.segment)
    }

    /// Report an error.
    ///
    /// The report count always increments. The message, severity, and
    /// detail only replace the latched values when `severity` is at least
    /// the latched one; the returned bool says whether that happened.
    /// When a latching report carries no detail the detail field is
    /// cleared, so stale detail from an earlier error cannot be read
    /// together with the new message.
    pub fn set_error(
        &mut self,
        message: &str,
        severity: ErrorSeverity,
        detail: Option<&str>,
    ) -> PluginResult<bool> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        let count = self.segment.read_u32(offsets::ERROR_COUNT)?;
        self.segment
            .write_u32(offsets::ERROR_COUNT, count.saturating_add(1))?;

        let current = ErrorSeverity::from_u32(self.segment.read_u32(offsets::ERROR_SEVERITY)?)
            .unwrap_or_default();
        if !should_latch(current, severity) {
            debug!(
                reported = ?severity,
                latched = ?current,
                "error report below latched severity"
            );
            return Ok(false);
        }

        self.segment
            .write_u32(offsets::ERROR_SEVERITY, severity as u32)?;
        self.segment
            .write_string(offsets::ERROR_MESSAGE, MAX_ERROR_TEXT, message)?;
        self.segment
            .write_string(offsets::ERROR_DETAIL, MAX_ERROR_TEXT_LONG, detail.unwrap_or(""))?;
        raise_flags(&mut self.segment, InterfaceFlags::NEW_ERROR)?;
        Ok(true)
    }

    /// Explicitly reset the latched error state for a new run.
    ///
    /// This is the only way severity moves downwards, terminal included.
    /// The report count is cumulative and stays.
    pub fn clear_error(&mut self) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment
            .write_u32(offsets::ERROR_SEVERITY, ErrorSeverity::None as u32)?;
        self.segment
            .write_string(offsets::ERROR_MESSAGE, MAX_ERROR_TEXT, "")?;
        self.segment
            .write_string(offsets::ERROR_DETAIL, MAX_ERROR_TEXT_LONG, "")?;
        clear_flags(&mut self.segment, InterfaceFlags::NEW_ERROR)
    }

    // ─── User fields ────────────────────────────────────────────────

    /// Read a user field slot. An id that is out of range or was never
    /// allocated reads as `Ok(None)`, not an error.
    pub fn get_user_field(&self, id: u32) -> PluginResult<Option<UserField>> {
        read_slot(&self.segment, id)
    }

    /// Allocate or replace a user field slot.
    pub fn set_user_field(
        &mut self,
        id: u32,
        label: &str,
        value: &str,
        enabled: bool,
    ) -> PluginResult<()> {
        if slot_index(id).is_none() {
            return Err(PluginError::Validation {
                field: "user_field",
                reason: format!("slot id {id} outside 1..={USER_FIELD_SLOTS}"),
            });
        }
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        write_slot(&mut self.segment, id, label, value, enabled)?;
        if let Some(flag) = InterfaceFlags::new_value_flag(id) {
            raise_flags(&mut self.segment, flag)?;
        }
        Ok(())
    }

    /// Update only the value of an already allocated slot.
    pub fn set_user_value(&mut self, id: u32, value: &str) -> PluginResult<()> {
        let Some(index) = slot_index(id) else {
            return Err(PluginError::Validation {
                field: "user_field",
                reason: format!("slot id {id} outside 1..={USER_FIELD_SLOTS}"),
            });
        };
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        let base = user_field_offset(index);
        if self.segment.read_u32(base + slot::ID)? != id {
            return Err(PluginError::Validation {
                field: "user_field",
                reason: format!("slot id {id} has not been allocated"),
            });
        }
        self.segment
            .write_string(base + slot::VALUE, MAX_DISPLAY_TEXT, value)?;
        if let Some(flag) = InterfaceFlags::new_value_flag(id) {
            raise_flags(&mut self.segment, flag)?;
        }
        Ok(())
    }

    // ─── Lifecycle end ──────────────────────────────────────────────

    /// Raise the stopped flag; the final signal of a run.
    pub fn mark_stopped(&mut self) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        raise_flags(&mut self.segment, InterfaceFlags::TEST_STOPPED)
    }
}

//! Harness-side creation and polling of the interface region.
//!
//! The real test harness is a separate program; this module is its
//! in-crate stand-in, used by integration tests and by operators driving
//! a plugin by hand. It owns the region and lock files (they are removed
//! on drop), feeds the plugin its inputs, and consumes the notification
//! flags the plugin raises.

use std::time::Duration;

use burnin::plugin::{ErrorSeverity, InterfaceFlags, StatusCode};
use burnin::shm::consts::MAX_DISPLAY_TEXT;
use burnin::shm::layout::{offsets, slot, user_field_offset};
use burnin_shared_memory::{CrossProcessLock, SharedSegment};
use tracing::info;

use crate::error::{PluginError, PluginResult};
use crate::error_state::ErrorReport;
use crate::interface::{
    UserField, acquire, clear_flags, read_error, read_flags, read_metrics, read_slot, slot_index,
};
use crate::metrics::MetricsSnapshot;

/// One consistent read of everything the plugin publishes.
#[derive(Debug, Clone)]
pub struct HarnessSnapshot {
    /// Pid the plugin registered on attach, if any.
    pub plugin_pid: Option<u32>,
    /// Version echoed by the plugin.
    pub interface_version: u32,
    /// Published status code.
    pub status_code: StatusCode,
    /// Published status text.
    pub status_text: String,
    /// Published cycle number.
    pub cycle: u32,
    /// Latched error severity.
    pub severity: ErrorSeverity,
    /// Raw flag bits.
    pub flags: InterfaceFlags,
    /// Operation and error counters.
    pub metrics: MetricsSnapshot,
    /// Published window title.
    pub window_title: String,
    /// Write-phase counter label.
    pub write_label: String,
    /// Read-phase counter label.
    pub read_label: String,
    /// Verify-phase counter label.
    pub verify_label: String,
}

/// The harness's half of the interface region.
pub struct HarnessInterface {
    segment: SharedSegment,
    lock: CrossProcessLock,
    lock_timeout: Duration,
}

impl HarnessInterface {
    /// Create the region and lock for segment `name`.
    ///
    /// Tests start paused (`test_running` false) at full duty, so an
    /// attaching plugin idles at a phase boundary until
    /// [`set_test_running`](Self::set_test_running) flips the flag.
    pub fn create(name: &str, lock_timeout: Duration) -> PluginResult<Self> {
        let mut segment = SharedSegment::create(name)?;
        let lock = CrossProcessLock::create(name)?;

        // No peer can be attached yet; plain writes are fine here.
        segment.write_u32(offsets::DUTY_CYCLE, 100)?;

        info!(segment = name, "harness region ready");
        Ok(Self {
            segment,
            lock,
            lock_timeout,
        })
    }

    /// Name of the owned segment.
    pub fn name(&self) -> &str {
        self.segment.name()
    }

    /// Start or stop the plugin's test loop.
    pub fn set_test_running(&mut self, running: bool) -> PluginResult<()> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment
            .write_u32(offsets::TEST_RUNNING, u32::from(running))?;
        Ok(())
    }

    /// Set the duty cycle percentage, 0-100.
    pub fn set_duty_cycle(&mut self, duty: u32) -> PluginResult<()> {
        if duty > 100 {
            return Err(PluginError::Validation {
                field: "duty_cycle",
                reason: format!("{duty} outside 0..=100"),
            });
        }
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        self.segment.write_u32(offsets::DUTY_CYCLE, duty)?;
        Ok(())
    }

    /// Read everything the plugin publishes under one lock acquisition.
    pub fn snapshot(&self) -> PluginResult<HarnessSnapshot> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        Ok(HarnessSnapshot {
            plugin_pid: match self.segment.read_u32(offsets::PLUGIN_PID)? {
                0 => None,
                pid => Some(pid),
            },
            interface_version: self.segment.read_u32(offsets::INTERFACE_VERSION)?,
            status_code: StatusCode::from_u32(self.segment.read_u32(offsets::STATUS_CODE)?)
                .unwrap_or_default(),
            status_text: self
                .segment
                .read_string(offsets::STATUS_TEXT, MAX_DISPLAY_TEXT)?,
            cycle: self.segment.read_u32(offsets::CYCLE)?,
            severity: ErrorSeverity::from_u32(self.segment.read_u32(offsets::ERROR_SEVERITY)?)
                .unwrap_or_default(),
            flags: read_flags(&self.segment)?,
            metrics: read_metrics(&self.segment)?,
            window_title: self
                .segment
                .read_string(offsets::WINDOW_TITLE, MAX_DISPLAY_TEXT)?,
            write_label: self
                .segment
                .read_string(offsets::WRITE_LABEL, MAX_DISPLAY_TEXT)?,
            read_label: self
                .segment
                .read_string(offsets::READ_LABEL, MAX_DISPLAY_TEXT)?,
            verify_label: self
                .segment
                .read_string(offsets::VERIFY_LABEL, MAX_DISPLAY_TEXT)?,
        })
    }

    /// Consume a status notification: the current status if the plugin
    /// published one since the last take, clearing the flag.
    pub fn take_new_status(&mut self) -> PluginResult<Option<(StatusCode, String)>> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        if !read_flags(&self.segment)?.contains(InterfaceFlags::NEW_STATUS) {
            return Ok(None);
        }
        let code = StatusCode::from_u32(self.segment.read_u32(offsets::STATUS_CODE)?)
            .unwrap_or_default();
        let text = self
            .segment
            .read_string(offsets::STATUS_TEXT, MAX_DISPLAY_TEXT)?;
        clear_flags(&mut self.segment, InterfaceFlags::NEW_STATUS)?;
        Ok(Some((code, text)))
    }

    /// Consume an error notification: the latched error state if the
    /// plugin published one since the last take, clearing the flag.
    pub fn take_new_error(&mut self) -> PluginResult<Option<ErrorReport>> {
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        if !read_flags(&self.segment)?.contains(InterfaceFlags::NEW_ERROR) {
            return Ok(None);
        }
        let report = read_error(&self.segment)?;
        clear_flags(&mut self.segment, InterfaceFlags::NEW_ERROR)?;
        Ok(Some(report))
    }

    /// Consume a user-field notification for slot `id`: the slot value if
    /// it changed since the last take. Only slots with a notification
    /// flag (1 and 2) ever return `Some`.
    pub fn take_new_user_value(&mut self, id: u32) -> PluginResult<Option<String>> {
        let Some(flag) = InterfaceFlags::new_value_flag(id) else {
            return Ok(None);
        };
        let _guard = acquire(&self.lock, self.lock_timeout)?;
        if !read_flags(&self.segment)?.contains(flag) {
            return Ok(None);
        }
        let base = user_field_offset(slot_index(id).unwrap_or(0));
        let value = self
            .segment
            .read_string(base + slot::VALUE, MAX_DISPLAY_TEXT)?;
        clear_flags(&mut self.segment, flag)?;
        Ok(Some(value))
    }

    /// Read a user field slot without touching its flag.
    pub fn user_field(&self, id: u32) -> PluginResult<Option<UserField>> {
        read_slot(&self.segment, id)
    }

    /// Whether the plugin has finished its run.
    pub fn plugin_stopped(&self) -> PluginResult<bool> {
        Ok(read_flags(&self.segment)?.contains(InterfaceFlags::TEST_STOPPED))
    }

    /// Pid the plugin registered on attach, if any.
    pub fn plugin_pid(&self) -> PluginResult<Option<u32>> {
        Ok(match self.segment.read_u32(offsets::PLUGIN_PID)? {
            0 => None,
            pid => Some(pid),
        })
    }
}

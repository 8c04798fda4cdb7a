//! Byte-offset layout of the plugin interface region (layout version 4).
//!
//! The region is a fixed-size page shared between the test harness and one
//! plugin process. Both sides address fields through the offsets below;
//! integers are little-endian, strings are fixed-capacity NUL-terminated
//! buffers (see [`crate::shm::strings`]). Serialization uses explicit
//! `to_le_bytes`/`from_le_bytes` at computed offsets - no `repr(C)`
//! reinterpret casts.
//!
//! ```text
//! 0    magic            [u8;8]      header, written by the harness
//! 8    layout_version    u32
//! 12   host_pid          u32
//! 16   plugin_pid        u32        written by the plugin on connect
//! 20   reserved          [u8;44]
//! 64   test_running      u32        harness → plugin
//! 68   duty_cycle        u32        harness → plugin, percent 0-100
//! 72   interface_version u32        plugin → harness (echo)
//! 76   status_code       u32
//! 80   cycle             u32
//! 84   error_severity    u32
//! 88   error_count       u32
//! 92   flags             u32        InterfaceFlags bits
//! 96   write_ops         u64
//! 104  read_ops          u64
//! 112  verify_ops        u64
//! 120  write_errors      u64
//! 128  read_errors       u64
//! 136  verify_errors     u64
//! 144  window_title      [u8;20]
//! 164  status_text       [u8;20]
//! 184  write_label       [u8;20]
//! 204  read_label        [u8;20]
//! 224  verify_label      [u8;20]
//! 244  error_message     [u8;100]
//! 344  error_detail      [u8;201]
//! 545  pad               [u8;3]
//! 548  user_fields       6 × 48-byte slot
//! 836  end of used area
//! ```

use static_assertions::{const_assert, const_assert_eq};

use crate::shm::consts::{
    MAX_DISPLAY_TEXT, MAX_ERROR_TEXT, MAX_ERROR_TEXT_LONG, SEGMENT_SIZE, USER_FIELD_SLOTS,
};

/// Byte offsets of every field in the interface region.
pub mod offsets {
    /// `[u8;8]` - segment magic.
    pub const MAGIC: usize = 0;
    pub const MAGIC_LEN: usize = 8;

    /// `u32` - layout version, written by the harness at creation.
    pub const LAYOUT_VERSION: usize = 8;

    /// `u32` - pid of the creating harness process.
    pub const HOST_PID: usize = 12;

    /// `u32` - pid of the attached plugin process (0 until connect).
    pub const PLUGIN_PID: usize = 16;

    /// `u32` (bool) - harness input: tests are running.
    pub const TEST_RUNNING: usize = 64;

    /// `u32` - harness input: duty cycle percentage, 0-100.
    pub const DUTY_CYCLE: usize = 68;

    /// `u32` - interface version echoed by the plugin.
    pub const INTERFACE_VERSION: usize = 72;

    /// `u32` - current `StatusCode` value.
    pub const STATUS_CODE: usize = 76;

    /// `u32` - current test cycle, monotonic within a run.
    pub const CYCLE: usize = 80;

    /// `u32` - latched `ErrorSeverity` value.
    pub const ERROR_SEVERITY: usize = 84;

    /// `u32` - total error reports this run, saturating.
    pub const ERROR_COUNT: usize = 88;

    /// `u32` - `InterfaceFlags` bits.
    pub const FLAGS: usize = 92;

    /// `u64` - write operations, saturating.
    pub const WRITE_OPS: usize = 96;

    /// `u64` - read operations, saturating.
    pub const READ_OPS: usize = 104;

    /// `u64` - verify operations, saturating.
    pub const VERIFY_OPS: usize = 112;

    /// `u64` - write phase errors, saturating.
    pub const WRITE_ERRORS: usize = 120;

    /// `u64` - read phase errors, saturating.
    pub const READ_ERRORS: usize = 128;

    /// `u64` - verify phase errors, saturating.
    pub const VERIFY_ERRORS: usize = 136;

    /// `[u8;20]` - window title.
    pub const WINDOW_TITLE: usize = 144;

    /// `[u8;20]` - status text.
    pub const STATUS_TEXT: usize = 164;

    /// `[u8;20]` - write operation label.
    pub const WRITE_LABEL: usize = 184;

    /// `[u8;20]` - read operation label.
    pub const READ_LABEL: usize = 204;

    /// `[u8;20]` - verify operation label.
    pub const VERIFY_LABEL: usize = 224;

    /// `[u8;100]` - latched error message.
    pub const ERROR_MESSAGE: usize = 244;

    /// `[u8;201]` - latched long error detail.
    pub const ERROR_DETAIL: usize = 344;

    /// First user-field slot (3 pad bytes after `ERROR_DETAIL`).
    pub const USER_FIELDS: usize = 548;

    /// End of the used area; the rest of the page is reserved.
    pub const END: usize = USER_FIELDS + super::USER_FIELD_SLOTS * super::USER_FIELD_STRIDE;
}

/// Size in bytes of one user-field slot.
pub const USER_FIELD_STRIDE: usize = 48;

/// Byte offsets within a user-field slot.
pub mod slot {
    /// `u32` - slot id, `1..=USER_FIELD_SLOTS`, written at creation.
    pub const ID: usize = 0;

    /// `u8` (bool) - slot enabled for display.
    pub const ENABLED: usize = 4;

    /// `[u8;20]` - slot label (3 pad bytes before).
    pub const LABEL: usize = 8;

    /// `[u8;20]` - slot value.
    pub const VALUE: usize = 28;
}

/// Returns the base offset of the user-field slot at `index`
/// (`0..USER_FIELD_SLOTS`).
#[inline]
pub const fn user_field_offset(index: usize) -> usize {
    debug_assert!(index < USER_FIELD_SLOTS);
    offsets::USER_FIELDS + index * USER_FIELD_STRIDE
}

/// Byte offsets of the lock region fields.
pub mod lock {
    /// `[u8;8]` - lock magic.
    pub const MAGIC: usize = 0;

    /// `u32` - layout version.
    pub const LAYOUT_VERSION: usize = 8;

    /// `u32` - owner pid, 0 when free. Accessed atomically.
    pub const OWNER_PID: usize = 12;
}

// Layout invariants, checked at compile time. String runs must line up
// exactly with the declared capacities and the 64-bit counters must stay
// 8-byte aligned.
const_assert_eq!(offsets::STATUS_TEXT, offsets::WINDOW_TITLE + MAX_DISPLAY_TEXT);
const_assert_eq!(offsets::WRITE_LABEL, offsets::STATUS_TEXT + MAX_DISPLAY_TEXT);
const_assert_eq!(offsets::READ_LABEL, offsets::WRITE_LABEL + MAX_DISPLAY_TEXT);
const_assert_eq!(offsets::VERIFY_LABEL, offsets::READ_LABEL + MAX_DISPLAY_TEXT);
const_assert_eq!(offsets::ERROR_MESSAGE, offsets::VERIFY_LABEL + MAX_DISPLAY_TEXT);
const_assert_eq!(offsets::ERROR_DETAIL, offsets::ERROR_MESSAGE + MAX_ERROR_TEXT);
const_assert!(offsets::USER_FIELDS >= offsets::ERROR_DETAIL + MAX_ERROR_TEXT_LONG);
const_assert_eq!(offsets::USER_FIELDS % 4, 0);
const_assert_eq!(offsets::WRITE_OPS % 8, 0);
const_assert_eq!(offsets::VERIFY_ERRORS % 8, 0);
const_assert_eq!(slot::VALUE, slot::LABEL + MAX_DISPLAY_TEXT);
const_assert_eq!(USER_FIELD_STRIDE, slot::VALUE + MAX_DISPLAY_TEXT);
const_assert_eq!(offsets::END, 836);
const_assert!(offsets::END <= SEGMENT_SIZE);
const_assert!(crate::shm::consts::LOCK_REGION_SIZE > lock::OWNER_PID + 4);

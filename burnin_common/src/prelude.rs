//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use burnin_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use burnin_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Interface Region ───────────────────────────────────────────────
pub use crate::shm::consts::{
    INTERFACE_VERSION, LOCK_REGION_SIZE, MAX_DISPLAY_TEXT, MAX_ERROR_TEXT, MAX_ERROR_TEXT_LONG,
    SEGMENT_SIZE, USER_FIELD_SLOTS,
};
pub use crate::shm::layout::{offsets, slot, user_field_offset, USER_FIELD_STRIDE};
pub use crate::shm::strings::{clean_copy, decode_field};

// ─── Plugin Domain ──────────────────────────────────────────────────
pub use crate::plugin::{ErrorSeverity, InterfaceFlags, LifecycleState, StatusCode};

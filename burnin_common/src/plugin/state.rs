//! Lifecycle state machine states.

use crate::plugin::status::StatusCode;

/// States of the plugin lifecycle controller.
///
/// In-process only; the harness sees the mapped [`StatusCode`] instead. The
/// controller moves `Initializing` → (`Writing` → `Reading` → `Verifying` →
/// `Waiting`)* → `Cleanup` → `Stopped`, detouring through `Error` when a
/// phase fails hard. Every exit path passes through `Cleanup`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Connecting and running start-up hooks.
    Initializing = 0,
    /// Write phase.
    Writing = 1,
    /// Read phase.
    Reading = 2,
    /// Verify phase.
    Verifying = 3,
    /// Duty-cycle delay between cycles.
    Waiting = 4,
    /// Running stop hooks and publishing final state.
    Cleanup = 5,
    /// A phase failed at run-stopping severity.
    Error = 6,
    /// Run finished; terminal.
    Stopped = 7,
}

impl LifecycleState {
    /// Converts a raw `u8` into a state, returning `None` for unknown values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Initializing),
            1 => Some(Self::Writing),
            2 => Some(Self::Reading),
            3 => Some(Self::Verifying),
            4 => Some(Self::Waiting),
            5 => Some(Self::Cleanup),
            6 => Some(Self::Error),
            7 => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Returns `true` if this state is part of the write/read/verify cycle.
    #[inline]
    pub const fn is_work_phase(self) -> bool {
        matches!(self, Self::Writing | Self::Reading | Self::Verifying)
    }

    /// Returns `true` once the controller can never run another cycle.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// The status code published while in this state.
    #[inline]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Initializing => StatusCode::Startup,
            Self::Writing => StatusCode::Writing,
            Self::Reading => StatusCode::Reading,
            Self::Verifying => StatusCode::Verifying,
            Self::Waiting => StatusCode::Waiting,
            Self::Cleanup => StatusCode::Cleanup,
            Self::Error => StatusCode::Error,
            Self::Stopped => StatusCode::PreTestCompleted,
        }
    }

    /// The status text published while in this state.
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Writing => "Writing",
            Self::Reading => "Reading",
            Self::Verifying => "Verifying",
            Self::Waiting => "Waiting",
            Self::Cleanup => "Cleaning up",
            Self::Error => "Error",
            Self::Stopped => "Stopped",
        }
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Initializing
    }
}

//! Error severity levels.

use serde::{Deserialize, Serialize};

/// Severity of a reported error, ordered from least to most severe.
///
/// Stored as a `u32` in the interface region. The ordering drives the error
/// latch: a report only replaces the latched one when its severity is at
/// least as high.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// No error.
    None = 0,
    /// Informational note, not a failure.
    Information = 1,
    /// Recoverable problem worth flagging.
    Warning = 2,
    /// Test failure; the run continues.
    Serious = 3,
    /// Failure the run cannot continue past.
    Critical = 4,
    /// Failure that also poisons later runs until reset.
    Terminal = 5,
}

impl ErrorSeverity {
    /// Converts a raw `u32` into a severity, returning `None` for unknown
    /// values.
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Information),
            2 => Some(Self::Warning),
            3 => Some(Self::Serious),
            4 => Some(Self::Critical),
            5 => Some(Self::Terminal),
            _ => None,
        }
    }

    /// Returns `true` if an error of this severity ends the run.
    #[inline]
    pub const fn stops_run(self) -> bool {
        matches!(self, Self::Critical | Self::Terminal)
    }

    /// Returns `true` if this severity survives a normal end-of-run reset.
    #[inline]
    pub const fn is_sticky(self) -> bool {
        matches!(self, Self::Terminal)
    }
}

impl Default for ErrorSeverity {
    fn default() -> Self {
        Self::None
    }
}

//! Plugin status codes published to the harness.

use serde::{Deserialize, Serialize};

/// Status code shown by the harness next to the plugin's status text.
///
/// Stored as a `u32` in the interface region.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    /// No status reported yet.
    NoStatus = 0,
    /// Plugin is starting up.
    Startup = 1,
    /// Plugin is allocating test resources.
    Allocate = 2,
    /// Write phase in progress.
    Writing = 3,
    /// Read phase in progress.
    Reading = 4,
    /// Verify phase in progress.
    Verifying = 5,
    /// Idle between cycles.
    Waiting = 6,
    /// Plugin is releasing test resources.
    Cleanup = 7,
    /// Plugin stopped on an error.
    Error = 8,
    /// Pre-test work finished.
    PreTestCompleted = 9,
}

impl StatusCode {
    /// Converts a raw `u32` into a status code, returning `None` for unknown
    /// values.
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::NoStatus),
            1 => Some(Self::Startup),
            2 => Some(Self::Allocate),
            3 => Some(Self::Writing),
            4 => Some(Self::Reading),
            5 => Some(Self::Verifying),
            6 => Some(Self::Waiting),
            7 => Some(Self::Cleanup),
            8 => Some(Self::Error),
            9 => Some(Self::PreTestCompleted),
            _ => None,
        }
    }

    /// Returns `true` if this code reports one of the three work phases.
    #[inline]
    pub const fn is_work_phase(self) -> bool {
        matches!(self, Self::Writing | Self::Reading | Self::Verifying)
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::NoStatus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_codes() {
        for value in 0..=9u32 {
            let code = StatusCode::from_u32(value).unwrap();
            assert_eq!(code as u32, value);
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert_eq!(StatusCode::from_u32(10), None);
        assert_eq!(StatusCode::from_u32(u32::MAX), None);
    }

    #[test]
    fn default_is_no_status() {
        assert_eq!(StatusCode::default(), StatusCode::NoStatus);
    }

    #[test]
    fn work_phase_codes() {
        assert!(StatusCode::Writing.is_work_phase());
        assert!(StatusCode::Verifying.is_work_phase());
        assert!(!StatusCode::Waiting.is_work_phase());
        assert!(!StatusCode::Error.is_work_phase());
    }
}

//! Plugin-domain types shared between the plugin and harness sides.
//!
//! Everything here has a fixed wire representation in the interface region:
//! [`StatusCode`] and [`ErrorSeverity`] are stored as little-endian `u32`
//! words, [`InterfaceFlags`] as a `u32` bitmask. [`LifecycleState`] is
//! in-process only and maps onto a [`StatusCode`] for publication.

pub mod flags;
pub mod severity;
pub mod state;
pub mod status;

pub use flags::InterfaceFlags;
pub use severity::ErrorSeverity;
pub use state::LifecycleState;
pub use status::StatusCode;

//! Shared-memory wire contract.
//!
//! Everything the plugin and the test harness must agree on lives here:
//! sizing constants, the byte-offset layout of the interface region, and
//! the codec for fixed-capacity display strings. The layout is versioned;
//! any change to offsets or field sizes requires bumping
//! [`consts::INTERFACE_VERSION`].

pub mod consts;
pub mod layout;
pub mod strings;

//! Interface region constants.
//!
//! These constants define the fundamental parameters of the plugin
//! interface region. They are the single source of truth - all other
//! crates import from here. The byte offsets derived from them live in
//! [`crate::shm::layout`].

/// Version of the interface layout, published in the region header and in
/// the `interface_version` body field.
///
/// Version 4 is the first layout carrying the long error detail field and
/// all six user-defined slots.
pub const INTERFACE_VERSION: u32 = 4;

/// Capacity in bytes of every display string field, terminator included:
/// window title, status text, operation labels, user-field labels and
/// values.
pub const MAX_DISPLAY_TEXT: usize = 20;

/// Capacity in bytes of the error message field, terminator included.
pub const MAX_ERROR_TEXT: usize = 100;

/// Capacity in bytes of the long error detail field, terminator included.
pub const MAX_ERROR_TEXT_LONG: usize = 201;

/// Number of user-defined field slots. Fixed at build time; slot ids are
/// `1..=USER_FIELD_SLOTS`.
pub const USER_FIELD_SLOTS: usize = 6;

/// Total size of the interface region in bytes.
///
/// One memory page. The used portion ends well below this (see
/// [`crate::shm::layout::offsets::END`]); the remainder is reserved for
/// future layout versions.
pub const SEGMENT_SIZE: usize = 4096;

/// Total size of the lock region in bytes (one cache line).
pub const LOCK_REGION_SIZE: usize = 64;

/// Magic bytes identifying an interface region.
pub const SEGMENT_MAGIC: [u8; 8] = *b"BITPLUG\0";

/// Magic bytes identifying a lock region.
pub const LOCK_MAGIC: [u8; 8] = *b"BITLOCK\0";

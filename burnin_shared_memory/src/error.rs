//! Error types for shared memory operations

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while creating, opening or accessing an interface
/// region.
#[derive(Error, Debug)]
pub enum ShmError {
    /// Segment name contains characters that cannot appear in a `/dev/shm`
    /// file name
    #[error("Invalid segment name: {name:?}")]
    InvalidName {
        /// Offending name
        name: String,
    },

    /// Segment already exists
    #[error("Segment already exists: {name}")]
    AlreadyExists {
        /// Segment name
        name: String,
    },

    /// Segment not found
    #[error("Segment not found: {name}")]
    NotFound {
        /// Segment name
        name: String,
    },

    /// Permission denied
    #[error("Permission denied accessing segment: {name}")]
    PermissionDenied {
        /// Segment name
        name: String,
    },

    /// Backing file has the wrong size for this layout
    #[error("Segment size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch {
        /// Size required by the layout
        expected: usize,
        /// Size of the backing file
        actual: usize,
    },

    /// Region does not start with the expected magic bytes
    #[error("Segment magic mismatch - not an interface region")]
    BadMagic,

    /// Region was created by an incompatible layout version
    #[error("Layout version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build speaks
        expected: u32,
        /// Version found in the region header
        found: u32,
    },

    /// Field access outside the mapped region
    #[error("Field access out of bounds: offset {offset}, len {len}")]
    OutOfBounds {
        /// Requested byte offset
        offset: usize,
        /// Requested length
        len: usize,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Metadata serialization/deserialization error
    #[error("Metadata error: {source}")]
    Json {
        /// Source JSON error
        #[from]
        source: serde_json::Error,
    },
}

/// Result type for shared memory operations
pub type ShmResult<T> = Result<T, ShmError>;

/// Errors from cross-process lock acquisition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Another live process held the lock for the whole timeout window
    #[error("Lock not acquired within {waited:?}")]
    Timeout {
        /// How long acquisition was attempted
        waited: Duration,
    },

    /// The calling process already holds the lock
    #[error("Lock already held by this process (pid {pid})")]
    AlreadyHeld {
        /// Holder pid
        pid: u32,
    },
}

//! # Burn-In Interface Region
//!
//! Shared memory transport between a test harness and an external test
//! plugin process. The harness creates a fixed-layout region plus a
//! companion lock region under `/dev/shm`; the plugin opens both by name
//! and publishes status, metrics and error state through typed field
//! accessors while the harness polls.
//!
//! ## Features
//!
//! - **Fixed Layout**: One 4 KiB page, every field at a named byte offset
//! - **Explicit Codec**: Little-endian reads/writes at computed offsets -
//!   no `repr(C)` reinterpret casts of foreign memory
//! - **Cross-Process Lock**: Pid-stamped compare-and-swap word with
//!   dead-holder reclaim, released by guard drop on every exit path
//! - **Header Validation**: Magic bytes and layout version checked before
//!   a peer touches any field
//! - **Lifecycle Cleanup**: The creating process removes backing files on
//!   drop; leftovers of crashed runs can be unlinked by name
//!
//! ## Usage
//!
//! Harness side:
//!
//! ```rust,no_run
//! use burnin_shared_memory::{SharedSegment, CrossProcessLock, ShmResult};
//! use burnin::shm::layout::offsets;
//!
//! fn main() -> ShmResult<()> {
//!     let mut segment = SharedSegment::create("plugin_0")?;
//!     let lock = CrossProcessLock::create("plugin_0")?;
//!     segment.write_u32(offsets::TEST_RUNNING, 1)?;
//!     Ok(())
//! }
//! ```
//!
//! Plugin side:
//!
//! ```rust,no_run
//! use burnin_shared_memory::{SharedSegment, CrossProcessLock, ShmResult};
//! use burnin::shm::layout::offsets;
//! use std::time::Duration;
//!
//! fn main() -> ShmResult<()> {
//!     let mut segment = SharedSegment::open("plugin_0")?;
//!     let lock = CrossProcessLock::open("plugin_0")?;
//!
//!     if let Ok(_guard) = lock.acquire(Duration::from_secs(5)) {
//!         segment.write_string(offsets::STATUS_TEXT, 20, "Writing")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All region operations return `Result<T, ShmError>`:
//!
//! ```rust,no_run
//! use burnin_shared_memory::{ShmError, SharedSegment};
//!
//! match SharedSegment::open("missing_segment") {
//!     Ok(segment) => { /* use segment */ }
//!     Err(ShmError::NotFound { name }) => {
//!         eprintln!("Segment '{}' not found - check the harness is running", name);
//!     }
//!     Err(ShmError::VersionMismatch { expected, found }) => {
//!         eprintln!("Harness speaks layout {found}, this build speaks {expected}");
//!     }
//!     Err(e) => eprintln!("Unexpected error: {}", e),
//! }
//! ```
//!
//! ## Process Safety
//!
//! - **SharedSegment**: one writer at a time; serialize writes through
//!   [`CrossProcessLock`]
//! - **CrossProcessLock**: safe to share between processes; acquisition is
//!   atomic on the owner word
//! - **Crash Recovery**: a lock held by a dead pid is reclaimed on the next
//!   acquire
//!
//! ## Platform Support
//!
//! Linux only. Regions are plain files in `tmpfs` (`/dev/shm`) mapped with
//! `memmap2`; process liveness uses the null signal via `nix`.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lock;
pub mod platform;
pub mod segment;

pub use error::{LockError, ShmError, ShmResult};
pub use lock::{CrossProcessLock, LockGuard};
pub use segment::{SegmentMetadata, SharedSegment};

/// Initialize tracing for plugin and harness binaries
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

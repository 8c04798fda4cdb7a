//! Platform-specific shared memory plumbing.
//!
//! Only Linux is supported; the interface region lives in `tmpfs` under
//! `/dev/shm` and liveness checks use the null signal.

pub mod linux;

pub use linux::{attach_region_mmap, create_region_mmap, current_pid, is_process_alive};

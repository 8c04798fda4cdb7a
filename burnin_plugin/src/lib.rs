//! Plugin protocol layer for the burn-in test harness interface.
//!
//! This crate sits on top of `burnin_shared_memory` and turns the raw
//! interface region into a typed, lifecycle-driven plugin framework. A
//! plugin implements [`PluginHooks`] (the three work phases plus optional
//! notifications) and hands it to a [`LifecycleController`], which owns
//! the region attachment and drives the bounded
//! write → read → verify → wait loop until the harness, a stop handle,
//! the cycle limit, or a critical failure ends the run.
//!
//! # Usage
//!
//! ```no_run
//! use burnin_plugin::{
//!     LifecycleController, MetricsDelta, PhaseFailure, PluginConfig, PluginHooks,
//!     PluginInterface,
//! };
//!
//! struct DiskTest {
//!     blocks: u64,
//! }
//!
//! impl PluginHooks for DiskTest {
//!     fn execute_write_phase(&mut self, iface: &mut PluginInterface) -> Result<(), PhaseFailure> {
//!         self.blocks += 64;
//!         iface.increment_metrics(&MetricsDelta { write_ops: 64, ..Default::default() })
//!             .map_err(|e| PhaseFailure::critical(e.to_string()))
//!     }
//!     fn execute_read_phase(&mut self, iface: &mut PluginInterface) -> Result<(), PhaseFailure> {
//!         iface.increment_metrics(&MetricsDelta { read_ops: 64, ..Default::default() })
//!             .map_err(|e| PhaseFailure::critical(e.to_string()))
//!     }
//!     fn execute_verify_phase(&mut self, iface: &mut PluginInterface) -> Result<(), PhaseFailure> {
//!         if self.blocks == 0 {
//!             return Err(PhaseFailure::new("nothing was written"));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PluginConfig::new("disk-burnin-01");
//!     burnin_plugin::init_tracing(config.shared.log_level);
//!
//!     // The harness passes the segment name on the command line.
//!     let controller = LifecycleController::connect("plugin_0", &config, DiskTest { blocks: 0 })?;
//!     let summary = controller.run();
//!     println!("completed {} cycles", summary.cycles_completed);
//!     Ok(())
//! }
//! ```
//!
//! # Error model
//!
//! Talking to the region can fail with [`PluginError`]: connection
//! failures are fatal and never retried, validation failures are local
//! and never touch the shared error state, and a lock timeout is treated
//! as a critical phase failure. Work itself fails with [`PhaseFailure`],
//! whose severity decides whether the run resumes at the next cycle
//! (below critical) or moves to cleanup. Severities latch: the harness
//! always sees the worst error so far, and terminal errors stick until
//! an explicit reset.
//!
//! # Harness side
//!
//! [`HarnessInterface`] is the in-crate stand-in for the real harness:
//! it creates the region, drives `test_running` and the duty cycle, and
//! consumes the notification flags. Integration tests run both halves in
//! one process.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod controller;
pub mod error;
pub mod error_state;
pub mod harness;
pub mod hooks;
pub mod interface;
pub mod metrics;

pub use crate::config::{LabelConfig, LifecycleConfig, PluginConfig};
pub use crate::connection::PluginConnection;
pub use crate::controller::{LifecycleController, RunSummary, StopHandle, StopReason};
pub use crate::error::{PhaseFailure, PluginError, PluginResult};
pub use crate::error_state::{ErrorReport, should_latch};
pub use crate::harness::{HarnessInterface, HarnessSnapshot};
pub use crate::hooks::PluginHooks;
pub use crate::interface::{PluginInterface, UserField};
pub use crate::metrics::{MetricsDelta, MetricsSnapshot, MetricsUpdate};

pub use burnin::config::LogLevel;
pub use burnin::plugin::{ErrorSeverity, InterfaceFlags, LifecycleState, StatusCode};

/// Initialize tracing for a plugin binary.
///
/// The configured level is the default; the `RUST_LOG` environment
/// variable overrides it when set.
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

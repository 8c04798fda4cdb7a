//! The extension points a plugin implements.
//!
//! A plugin is a [`PluginHooks`] implementation handed to the
//! [`LifecycleController`](crate::LifecycleController). The three phase
//! hooks are required and do the actual test work; the rest are optional
//! notifications with no-op defaults. Every hook receives the typed
//! interface so it can publish metrics, status, and user fields while it
//! runs.
//!
//! Hooks never see the region lock directly. Each interface call acquires
//! and releases it on its own, so a hook that takes a long time between
//! calls never blocks the harness.

use crate::error::PhaseFailure;
use crate::interface::PluginInterface;

/// Work phases and lifecycle notifications implemented by a plugin.
///
/// ```no_run
/// use burnin_plugin::{PhaseFailure, PluginHooks, PluginInterface};
///
/// struct NullTest;
///
/// impl PluginHooks for NullTest {
///     fn execute_write_phase(&mut self, _iface: &mut PluginInterface) -> Result<(), PhaseFailure> {
///         Ok(())
///     }
///     fn execute_read_phase(&mut self, _iface: &mut PluginInterface) -> Result<(), PhaseFailure> {
///         Ok(())
///     }
///     fn execute_verify_phase(&mut self, _iface: &mut PluginInterface) -> Result<(), PhaseFailure> {
///         Ok(())
///     }
/// }
/// ```
pub trait PluginHooks {
    /// Write-phase work. Runs first in every cycle.
    fn execute_write_phase(&mut self, iface: &mut PluginInterface) -> Result<(), PhaseFailure>;

    /// Read-phase work. Runs after a successful write phase.
    fn execute_read_phase(&mut self, iface: &mut PluginInterface) -> Result<(), PhaseFailure>;

    /// Verify-phase work. Runs after a successful read phase.
    fn execute_verify_phase(&mut self, iface: &mut PluginInterface) -> Result<(), PhaseFailure>;

    /// One-time setup before the first cycle. A failure here skips the
    /// cycle loop entirely and goes straight to cleanup.
    fn on_start(&mut self, iface: &mut PluginInterface) -> Result<(), PhaseFailure> {
        let _ = iface;
        Ok(())
    }

    /// One-time teardown during cleanup. Invoked exactly once per run, on
    /// every path out of the lifecycle.
    fn on_stop(&mut self, iface: &mut PluginInterface) {
        let _ = iface;
    }

    /// Called when a cycle begins, before the write phase.
    fn on_cycle_start(&mut self, iface: &mut PluginInterface, cycle: u32) {
        let _ = (iface, cycle);
    }

    /// Called when all three phases of a cycle completed.
    fn on_cycle_end(&mut self, iface: &mut PluginInterface, cycle: u32) {
        let _ = (iface, cycle);
    }

    /// Called after a failure was published, before the controller decides
    /// whether the run continues.
    fn on_error(&mut self, iface: &mut PluginInterface, failure: &PhaseFailure) {
        let _ = (iface, failure);
    }
}

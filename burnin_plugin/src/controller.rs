//! The bounded write → read → verify → wait lifecycle.
//!
//! [`LifecycleController`] owns the typed interface and a
//! [`PluginHooks`] implementation and drives the run: it publishes the
//! status for each state before invoking the matching hook, translates
//! hook failures into error-state publications, and decides from the
//! failure severity whether the run resumes at the next cycle or ends.
//! Every path out of the loop passes through cleanup, where `on_stop`
//! runs exactly once and the stopped flag is raised.
//!
//! Stops are cooperative. The controller looks for them at phase
//! boundaries and while idling between cycles, from three sources: the
//! harness clearing the run flag, a [`StopHandle`], and the configured
//! cycle limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use burnin::plugin::{ErrorSeverity, LifecycleState};
use tracing::{debug, error, info, warn};

use crate::config::{LifecycleConfig, PluginConfig};
use crate::error::{PhaseFailure, PluginError, PluginResult};
use crate::hooks::PluginHooks;
use crate::interface::PluginInterface;
use crate::metrics::MetricsDelta;

/// Longest uninterruptible sleep while idling between cycles.
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// Requests a cooperative stop of a running lifecycle.
///
/// Clones share one flag, so a handle can be parked on another thread or
/// inside the hooks themselves.
#[derive(Debug, Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Ask the controller to stop at the next phase boundary.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The harness cleared the run flag.
    HostStopped,
    /// A [`StopHandle`] asked for a stop.
    StopRequested,
    /// The configured cycle limit was reached.
    CycleLimit,
    /// A failure at run-stopping severity.
    Faulted(ErrorSeverity),
}

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that completed all three phases.
    pub cycles_completed: u32,
    /// Wall-clock time from start to stopped.
    pub runtime: Duration,
    /// Why the run ended.
    pub stopped_by: StopReason,
}

enum FailureOutcome {
    Resume,
    Abort(StopReason),
}

/// Idle time after a cycle for a duty-cycle percentage.
fn idle_duration(duty: u32, delay_base: Duration) -> Duration {
    delay_base.saturating_mul(100 - duty.min(100))
}

/// Failures of the controller's own interface publishes. The channel to
/// the harness is broken, so these always end the run.
fn region_fault(error: PluginError) -> PhaseFailure {
    PhaseFailure::critical(format!("interface publish failed: {error}"))
}

/// Drives a [`PluginHooks`] implementation through the lifecycle.
pub struct LifecycleController<H: PluginHooks> {
    interface: PluginInterface,
    hooks: H,
    lifecycle: LifecycleConfig,
    stop_flag: Arc<AtomicBool>,
    state: LifecycleState,
}

impl<H: PluginHooks> LifecycleController<H> {
    /// Validate `config`, attach to region `name`, and build a controller.
    ///
    /// A name that does not resolve to a live region fails here with
    /// [`PluginError::Connection`]; no hook has run yet in that case.
    pub fn connect(name: &str, config: &PluginConfig, hooks: H) -> PluginResult<Self> {
        config.validate().map_err(|e| PluginError::Validation {
            field: "config",
            reason: e.to_string(),
        })?;
        let interface = PluginInterface::connect(name, config)?;
        Ok(Self::new(interface, hooks, config.lifecycle.clone()))
    }

    /// Build a controller around an already initialized interface.
    pub fn new(interface: PluginInterface, hooks: H, lifecycle: LifecycleConfig) -> Self {
        Self {
            interface,
            hooks,
            lifecycle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            state: LifecycleState::Initializing,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// A handle that can stop this run from anywhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: Arc::clone(&self.stop_flag),
        }
    }

    /// The typed interface, for publishing before the run starts.
    pub fn interface(&self) -> &PluginInterface {
        &self.interface
    }

    /// Mutable access to the typed interface.
    pub fn interface_mut(&mut self) -> &mut PluginInterface {
        &mut self.interface
    }

    /// Run the lifecycle to completion and report what happened.
    ///
    /// Consumes the controller; dropping the interface at the end releases
    /// the region attachment. Failures after the run has started are
    /// reported through the region and the summary rather than as an
    /// error return.
    pub fn run(mut self) -> RunSummary {
        let started = Instant::now();
        info!(segment = self.interface.segment_name(), "lifecycle starting");

        let mut cycles_completed = 0;
        let reason = self.drive(&mut cycles_completed);
        self.cleanup(&reason);

        let summary = RunSummary {
            cycles_completed,
            runtime: started.elapsed(),
            stopped_by: reason,
        };
        info!(
            cycles = summary.cycles_completed,
            runtime_ms = summary.runtime.as_millis() as u64,
            reason = ?summary.stopped_by,
            "lifecycle stopped"
        );
        summary
    }

    fn drive(&mut self, cycles_completed: &mut u32) -> StopReason {
        if let Err(failure) = self.hooks.on_start(&mut self.interface) {
            let severity = failure.severity;
            let _ = self.handle_failure(LifecycleState::Initializing, failure);
            return StopReason::Faulted(severity);
        }

        let mut cycle: u32 = 0;
        loop {
            match self.check_stop() {
                Ok(Some(reason)) => return reason,
                Ok(None) => {}
                Err(failure) => return self.fail(failure),
            }
            if self.lifecycle.max_cycles > 0 && *cycles_completed >= self.lifecycle.max_cycles {
                return StopReason::CycleLimit;
            }

            cycle = cycle.saturating_add(1);
            if let Err(failure) = self.begin_cycle(cycle) {
                return self.fail(failure);
            }

            let mut cycle_ok = true;
            for phase in [
                LifecycleState::Writing,
                LifecycleState::Reading,
                LifecycleState::Verifying,
            ] {
                match self.check_stop() {
                    Ok(Some(reason)) => return reason,
                    Ok(None) => {}
                    Err(failure) => return self.fail(failure),
                }
                if let Err(failure) = self.run_phase(phase) {
                    match self.handle_failure(phase, failure) {
                        FailureOutcome::Resume => {
                            cycle_ok = false;
                            break;
                        }
                        FailureOutcome::Abort(reason) => return reason,
                    }
                }
            }

            if cycle_ok {
                self.hooks.on_cycle_end(&mut self.interface, cycle);
                *cycles_completed += 1;
            }

            if let Err(e) = self.enter(LifecycleState::Waiting) {
                return self.fail(region_fault(e));
            }
            self.duty_wait();
        }
    }

    /// Stop sources checked at every phase boundary.
    fn check_stop(&self) -> Result<Option<StopReason>, PhaseFailure> {
        if self.stop_flag.load(Ordering::Acquire) {
            return Ok(Some(StopReason::StopRequested));
        }
        match self.interface.test_running() {
            Ok(true) => Ok(None),
            Ok(false) => Ok(Some(StopReason::HostStopped)),
            Err(e) => Err(region_fault(e)),
        }
    }

    fn begin_cycle(&mut self, cycle: u32) -> Result<(), PhaseFailure> {
        self.interface.set_cycle(cycle).map_err(region_fault)?;
        self.hooks.on_cycle_start(&mut self.interface, cycle);
        Ok(())
    }

    fn run_phase(&mut self, phase: LifecycleState) -> Result<(), PhaseFailure> {
        self.enter(phase).map_err(region_fault)?;
        match phase {
            LifecycleState::Writing => self.hooks.execute_write_phase(&mut self.interface),
            LifecycleState::Reading => self.hooks.execute_read_phase(&mut self.interface),
            LifecycleState::Verifying => self.hooks.execute_verify_phase(&mut self.interface),
            _ => Ok(()),
        }
    }

    /// Move to `state` and publish its status code and text.
    fn enter(&mut self, state: LifecycleState) -> PluginResult<()> {
        self.state = state;
        debug!(state = state.label(), "lifecycle state");
        self.interface.set_status(state.status_code(), state.label())
    }

    /// Publish a failure, notify the hooks, and decide how the run
    /// continues.
    fn handle_failure(&mut self, phase: LifecycleState, failure: PhaseFailure) -> FailureOutcome {
        error!(
            phase = phase.label(),
            severity = ?failure.severity,
            message = %failure.message,
            "phase failed"
        );
        self.state = LifecycleState::Error;
        if let Err(e) = self.publish_failure(phase, &failure) {
            warn!(error = %e, "could not publish error state");
        }
        self.hooks.on_error(&mut self.interface, &failure);
        if failure.stops_run() {
            FailureOutcome::Abort(StopReason::Faulted(failure.severity))
        } else {
            FailureOutcome::Resume
        }
    }

    /// A failure outside the work phases; always ends the run.
    fn fail(&mut self, failure: PhaseFailure) -> StopReason {
        let severity = failure.severity;
        match self.handle_failure(self.state, failure) {
            FailureOutcome::Abort(reason) => reason,
            FailureOutcome::Resume => StopReason::Faulted(severity),
        }
    }

    fn publish_failure(&mut self, phase: LifecycleState, failure: &PhaseFailure) -> PluginResult<()> {
        self.interface.set_status(
            LifecycleState::Error.status_code(),
            LifecycleState::Error.label(),
        )?;
        self.interface
            .set_error(&failure.message, failure.severity, failure.detail.as_deref())?;
        let errors = match phase {
            LifecycleState::Writing => MetricsDelta {
                write_errors: 1,
                ..MetricsDelta::empty()
            },
            LifecycleState::Reading => MetricsDelta {
                read_errors: 1,
                ..MetricsDelta::empty()
            },
            LifecycleState::Verifying => MetricsDelta {
                verify_errors: 1,
                ..MetricsDelta::empty()
            },
            _ => MetricsDelta::empty(),
        };
        self.interface.increment_metrics(&errors)
    }

    /// Idle between cycles per the harness duty cycle, watching for stops
    /// so a request never waits out the whole delay.
    fn duty_wait(&self) {
        let duty = match self.interface.duty_cycle() {
            Ok(duty) => duty,
            Err(_) => return,
        };
        let total = idle_duration(duty, self.lifecycle.delay_base());
        if total.is_zero() {
            return;
        }
        let deadline = Instant::now() + total;
        while Instant::now() < deadline {
            if self.stop_flag.load(Ordering::Acquire)
                || !self.interface.test_running().unwrap_or(false)
            {
                return;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            thread::sleep(remaining.min(WAIT_SLICE));
        }
    }

    /// The one exit path. Publishes the final state and runs `on_stop`.
    fn cleanup(&mut self, reason: &StopReason) {
        self.state = LifecycleState::Cleanup;
        // On a faulted run the error status stays latched in the region;
        // the cleanup status would mask it before the harness has looked.
        if !matches!(reason, StopReason::Faulted(_)) {
            if let Err(e) = self.enter(LifecycleState::Cleanup) {
                warn!(error = %e, "could not publish cleanup status");
            }
        }
        self.hooks.on_stop(&mut self.interface);
        if let Err(e) = self.interface.mark_stopped() {
            warn!(error = %e, "could not publish stopped flag");
        }
        self.state = LifecycleState::Stopped;
    }
}

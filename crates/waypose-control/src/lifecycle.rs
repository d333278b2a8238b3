//! [`GpsLifecycle`] – location-service acquisition state machine.
//!
//! The original platform models GPS acquisition as a coroutine: stop any
//! running session, wait a second for the platform to settle, request a
//! start, then poll the service status once per second for up to twenty
//! seconds.  Here the same sequence is an explicit state machine advanced by
//! elapsed-time accumulation: callers feed `dt` into [`GpsLifecycle::tick`]
//! and each accumulated whole second advances the machine one step.  No
//! suspension primitive, no extra thread.
//!
//! Failure (a start refusal, a `Failed` service status, or countdown
//! exhaustion) parks the machine in a terminal `Failed` phase that only an
//! explicit [`restart`][GpsLifecycle::restart] leaves.  Restart atomically
//! abandons whatever sequence was in flight, so at most one acquisition
//! sequence is ever active.

use tracing::{info, warn};
use waypose_hal::{LocationSource, LocationStatus};
use waypose_types::ControllerStatus;

/// Settle wait after stopping the previous session, in seconds.
const STOP_SETTLE_SECS: u8 = 1;

/// How many one-second status polls acquisition may take before failing.
const ACQUISITION_BUDGET_SECS: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No sequence has been started yet.
    Idle,
    /// Previous session stopped; waiting for the platform to settle.
    Stopping { seconds_left: u8 },
    /// Start has just been issued.
    Requesting,
    /// Polling the service status, counting down the acquisition budget.
    Connecting { seconds_left: u8 },
    /// The service is running.
    Active,
    /// Terminal until `restart()`.
    Failed,
}

/// Tick-driven acquisition state machine over a [`LocationSource`].
#[derive(Debug)]
pub struct GpsLifecycle {
    phase: Phase,
    /// Sub-second remainder carried between ticks.
    accumulated: f32,
}

impl Default for GpsLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl GpsLifecycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            accumulated: 0.0,
        }
    }

    /// Begin the acquisition sequence.
    ///
    /// Stops the service first (idempotent on the source side) and enters
    /// the settle wait, abandoning any sequence already in flight.  Calling
    /// this again before the settle elapses does not queue a second
    /// sequence; it restarts the same one.
    pub fn start(&mut self, source: &mut dyn LocationSource) {
        source.stop();
        self.accumulated = 0.0;
        self.phase = Phase::Stopping {
            seconds_left: STOP_SETTLE_SECS,
        };
    }

    /// Abandon the in-flight sequence (or the terminal `Failed` state) and
    /// begin a fresh one with a full acquisition budget.
    pub fn restart(&mut self, source: &mut dyn LocationSource) {
        info!("location lifecycle restart requested");
        self.start(source);
    }

    /// Advance the machine by `dt` seconds of elapsed time.
    pub fn tick(&mut self, source: &mut dyn LocationSource, dt: f32) {
        self.accumulated += dt.max(0.0);
        while self.accumulated >= 1.0 {
            self.accumulated -= 1.0;
            self.advance_second(source);
        }
    }

    /// `true` while the service is acquired and fixes may be consumed.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// `true` in the terminal failure state awaiting a manual restart.
    pub fn is_failed(&self) -> bool {
        self.phase == Phase::Failed
    }

    /// Operator-facing view of the current phase.
    pub fn status(&self) -> ControllerStatus {
        match self.phase {
            Phase::Idle => ControllerStatus::Initializing,
            Phase::Stopping { .. } => ControllerStatus::Restarting,
            Phase::Requesting => ControllerStatus::RequestingGps,
            Phase::Connecting { seconds_left } => ControllerStatus::ConnectingGps { seconds_left },
            Phase::Active => ControllerStatus::GpsActive,
            Phase::Failed => ControllerStatus::Failed,
        }
    }

    fn advance_second(&mut self, source: &mut dyn LocationSource) {
        self.phase = match self.phase {
            Phase::Stopping { seconds_left } if seconds_left > 1 => Phase::Stopping {
                seconds_left: seconds_left - 1,
            },
            Phase::Stopping { .. } => match source.start() {
                Ok(()) => Phase::Requesting,
                Err(e) => {
                    warn!(error = %e, "location service refused start");
                    Phase::Failed
                }
            },
            Phase::Requesting => Phase::Connecting {
                seconds_left: ACQUISITION_BUDGET_SECS,
            },
            Phase::Connecting { seconds_left } => match source.status() {
                LocationStatus::Running => {
                    info!("location service acquired");
                    Phase::Active
                }
                LocationStatus::Failed => {
                    warn!("location service reported failure during acquisition");
                    Phase::Failed
                }
                LocationStatus::Initializing | LocationStatus::Stopped => {
                    if seconds_left <= 1 {
                        warn!("location acquisition timed out");
                        Phase::Failed
                    } else {
                        Phase::Connecting {
                            seconds_left: seconds_left - 1,
                        }
                    }
                }
            },
            // Idle, Active, and Failed hold until start()/restart().
            other => other,
        };
    }
}

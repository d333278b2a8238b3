//! [`MotionController`] – the geofenced motion controller.
//!
//! Consumes one position fix, one accelerometer reading, and one compass
//! heading per tick and integrates the avatar [`Pose`]:
//!
//! 1. the zero filter discards `(0, 0)` noise fixes ([`FixFilter`]);
//! 2. the retained fix is gated by the [`Geofence`]: outside the rectangle
//!    every pose update is suppressed and the pose freezes;
//! 3. inside the rectangle the orientation slerps toward `yaw(-heading)` at
//!    `rotation_smoothing * dt` (exponential approach, never an
//!    instantaneous snap, never an overshoot);
//! 4. forward speed is `-accel.z` dead-zoned below the configured
//!    threshold, and the position advances along the current local forward
//!    axis by `speed * speed_multiplier * dt`.
//!
//! Sensor absence and GPS failure are non-fatal: the controller never
//! returns an error, it returns a [`ControllerStatus`].

use tracing::debug;
use waypose_hal::LocationSource;
use waypose_types::{ControllerStatus, Pose, PositionFix, Quaternion, SensorReading, Vec3};

use crate::fix_filter::{FixFilter, FixOutcome};
use crate::geofence::Geofence;
use crate::lifecycle::GpsLifecycle;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tuning for [`MotionController`].
#[derive(Debug, Clone, Copy)]
pub struct MotionConfig {
    pub bounds: waypose_types::GeoBounds,
    /// Scales forward displacement per unit of filtered acceleration.
    pub speed_multiplier: f32,
    /// Exponential approach rate for the heading slerp (per second).
    pub rotation_smoothing: f32,
    /// Accelerations below this magnitude are treated as stationary jitter.
    pub deadband: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            bounds: waypose_types::GeoBounds::default(),
            speed_multiplier: 5.0,
            rotation_smoothing: 2.0,
            deadband: 0.1,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MotionController
// ────────────────────────────────────────────────────────────────────────────

/// Geofenced sensor-fusion controller for the avatar pose.
///
/// Owns the GPS acquisition lifecycle, the zero-fix filter, the geofence,
/// and the current pose.  Drive it with
/// [`advance_gps`][Self::advance_gps] + [`update`][Self::update] once per
/// tick.
pub struct MotionController {
    config: MotionConfig,
    lifecycle: GpsLifecycle,
    filter: FixFilter,
    geofence: Geofence,
    pose: Pose,
    status: ControllerStatus,
}

impl MotionController {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            geofence: Geofence::new(config.bounds),
            config,
            lifecycle: GpsLifecycle::new(),
            filter: FixFilter::new(),
            pose: Pose::default(),
            status: ControllerStatus::Initializing,
        }
    }

    /// Begin GPS acquisition.  Call once at startup.
    pub fn start(&mut self, source: &mut dyn LocationSource) {
        self.lifecycle.start(source);
        self.status = self.lifecycle.status();
    }

    /// Manual restart: abandon the in-flight acquisition (or the terminal
    /// failure) and start over with a full budget.  Always available, in
    /// every state.  The retained fix survives the restart.
    pub fn restart(&mut self, source: &mut dyn LocationSource) {
        self.lifecycle.restart(source);
        self.status = self.lifecycle.status();
    }

    /// Advance the acquisition state machine by `dt` seconds.
    pub fn advance_gps(&mut self, source: &mut dyn LocationSource, dt: f32) {
        self.lifecycle.tick(source, dt);
    }

    /// Integrate one tick.
    ///
    /// `heading_deg` is the compass true heading in degrees clockwise from
    /// north; `accel` is this tick's accelerometer reading (its
    /// availability flag is honoured, and an absent accelerometer simply
    /// yields zero forward speed).
    pub fn update(
        &mut self,
        fix: PositionFix,
        accel: &SensorReading,
        heading_deg: f32,
        dt: f32,
    ) -> ControllerStatus {
        // Until the service is acquired the lifecycle owns the status and
        // the pose stays frozen.  Fixes read from a non-running service are
        // stale platform echoes, so they are not even filtered.
        if !self.lifecycle.is_active() {
            self.status = self.lifecycle.status();
            return self.status;
        }

        match self.filter.submit(fix) {
            FixOutcome::Accepted => self.status = ControllerStatus::SignalOk,
            // A discarded zero keeps whatever status the last real fix set.
            FixOutcome::ZeroDiscarded => {}
            FixOutcome::NoFixYet => {
                self.status = ControllerStatus::ReceivingZero;
                return self.status;
            }
        }

        let Some(current) = self.filter.last_valid() else {
            return self.status;
        };

        if !self.geofence.contains(&current) {
            debug!(
                latitude = current.latitude,
                longitude = current.longitude,
                "retained fix outside geofence; pose frozen"
            );
            self.status = ControllerStatus::OutOfBounds {
                latitude: current.latitude,
                longitude: current.longitude,
            };
            return self.status;
        }

        self.integrate(accel, heading_deg, dt);
        self.status
    }

    /// The avatar pose after the most recent tick.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The operator-facing status after the most recent tick.
    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    /// The retained (last valid) fix, if any.
    pub fn last_fix(&self) -> Option<PositionFix> {
        self.filter.last_valid()
    }

    /// `true` while the location service is acquired.
    pub fn gps_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    fn integrate(&mut self, accel: &SensorReading, heading_deg: f32, dt: f32) {
        let dt = dt.max(0.0);

        // Compass heading is clockwise from north; yaw is counter-clockwise.
        let target = Quaternion::from_yaw(-heading_deg);
        self.pose.rotation = self
            .pose
            .rotation
            .slerp(target, self.config.rotation_smoothing * dt);

        let mut speed = if accel.available {
            -accel.vector.z
        } else {
            0.0
        };
        if speed.abs() < self.config.deadband {
            speed = 0.0;
        }
        if speed != 0.0 {
            let forward = self.pose.rotation.rotate(Vec3::forward());
            self.pose.position = self
                .pose
                .position
                .add(forward.scaled(speed * self.config.speed_multiplier * dt));
        }
    }
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

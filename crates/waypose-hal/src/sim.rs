//! In-process simulated drivers for headless testing without a device.
//!
//! [`SimRig`] assembles a fully simulated stack (aggregator + location +
//! compass) so the complete waypose pipeline can run in CI and in the demo
//! binary with no physical sensors attached.
//!
//! # Example
//!
//! ```rust
//! use waypose_hal::sim::{SimLocation, SimRig};
//! use waypose_types::{PositionFix, SensorKind, Vec3};
//!
//! let stack = SimRig::new()
//!     .with_sensor(SensorKind::Accelerometer, Vec3::new(0.0, -9.8, -0.5))
//!     .with_location(SimLocation::new().with_init_delay(2).with_fix(PositionFix::new(28.5, -16.0)))
//!     .with_heading(90.0)
//!     .build();
//! ```

use std::collections::VecDeque;

use waypose_types::{PositionFix, SensorKind, Vec3, WayposeError};

use crate::aggregator::SensorAggregator;
use crate::compass::Compass;
use crate::location::{LocationSource, LocationStatus};
use crate::sensor::SensorSource;

// ────────────────────────────────────────────────────────────────────────────
// Sim sensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated vector sensor.
///
/// Reads pop from a script queue first and fall back to a constant value
/// once the script is exhausted, so a test can describe a short motion
/// profile and then hold still.
pub struct SimSensor {
    kind: SensorKind,
    connected: bool,
    enabled: bool,
    script: VecDeque<Vec3>,
    fallback: Vec3,
}

impl SimSensor {
    /// A sensor that always reports `value`.
    pub fn constant(kind: SensorKind, value: Vec3) -> Box<Self> {
        Box::new(Self {
            kind,
            connected: true,
            enabled: false,
            script: VecDeque::new(),
            fallback: value,
        })
    }

    /// A sensor that plays back `script` one reading per poll, then holds
    /// the last scripted value.
    pub fn scripted(kind: SensorKind, script: Vec<Vec3>) -> Box<Self> {
        let fallback = script.last().copied().unwrap_or(Vec3::zero());
        Box::new(Self {
            kind,
            connected: true,
            enabled: false,
            script: script.into(),
            fallback,
        })
    }

    /// Simulate the device appearing or disappearing mid-session.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if !connected {
            self.enabled = false;
        }
    }
}

impl SensorSource for SimSensor {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn enable(&mut self) -> Result<(), WayposeError> {
        if !self.connected {
            return Err(WayposeError::SensorUnavailable { kind: self.kind });
        }
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn read(&mut self) -> Result<Vec3, WayposeError> {
        Ok(self.script.pop_front().unwrap_or(self.fallback))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sim location
// ────────────────────────────────────────────────────────────────────────────

/// A simulated location service with a configurable acquisition profile.
///
/// After [`start`][LocationSource::start] the service reports
/// `Initializing` for `init_delay` status polls (one poll per lifecycle
/// second), then `Running`, or `Failed` when configured with
/// [`fail_after_init`][Self::fail_after_init], or `Initializing` forever
/// with [`stuck`][Self::stuck] (for timeout testing).  Fixes pop from a
/// queue, holding the last value once exhausted; before any data the
/// service reports `(0, 0)` like real platforms do.
pub struct SimLocation {
    state: LocationStatus,
    init_delay: u32,
    remaining_init: u32,
    stuck: bool,
    fail_after_init: bool,
    refuse_start: bool,
    fixes: VecDeque<PositionFix>,
    last: PositionFix,
    start_calls: usize,
    stop_calls: usize,
}

impl Default for SimLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl SimLocation {
    pub fn new() -> Self {
        Self {
            state: LocationStatus::Stopped,
            init_delay: 0,
            remaining_init: 0,
            stuck: false,
            fail_after_init: false,
            refuse_start: false,
            fixes: VecDeque::new(),
            last: PositionFix::new(0.0, 0.0),
            start_calls: 0,
            stop_calls: 0,
        }
    }

    /// Report `Initializing` for `polls` status polls after each start.
    pub fn with_init_delay(mut self, polls: u32) -> Self {
        self.init_delay = polls;
        self
    }

    /// Never leave `Initializing` (drives the 20-second timeout path).
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    /// Transition to `Failed` instead of `Running` once initialised.
    pub fn fail_after_init(mut self) -> Self {
        self.fail_after_init = true;
        self
    }

    /// Make `start()` itself return an error.
    pub fn refuse_start(mut self) -> Self {
        self.refuse_start = true;
        self
    }

    /// Append a fix to the playback queue.
    pub fn with_fix(mut self, fix: PositionFix) -> Self {
        self.fixes.push_back(fix);
        self
    }

    /// Append a whole fix stream to the playback queue.
    pub fn with_fixes(mut self, fixes: impl IntoIterator<Item = PositionFix>) -> Self {
        self.fixes.extend(fixes);
        self
    }

    /// How many times `start()` has been called.
    pub fn start_count(&self) -> usize {
        self.start_calls
    }

    /// How many times `stop()` has been called.
    pub fn stop_count(&self) -> usize {
        self.stop_calls
    }
}

impl LocationSource for SimLocation {
    fn status(&mut self) -> LocationStatus {
        if self.state == LocationStatus::Initializing && !self.stuck {
            if self.remaining_init > 0 {
                self.remaining_init -= 1;
            } else {
                self.state = if self.fail_after_init {
                    LocationStatus::Failed
                } else {
                    LocationStatus::Running
                };
            }
        }
        self.state
    }

    fn start(&mut self) -> Result<(), WayposeError> {
        self.start_calls += 1;
        if self.refuse_start {
            self.state = LocationStatus::Failed;
            return Err(WayposeError::GpsFailed {
                details: "simulated start refusal".to_string(),
            });
        }
        self.state = LocationStatus::Initializing;
        self.remaining_init = self.init_delay;
        Ok(())
    }

    fn stop(&mut self) {
        self.stop_calls += 1;
        self.state = LocationStatus::Stopped;
    }

    fn last_fix(&mut self) -> PositionFix {
        if self.state == LocationStatus::Running {
            if let Some(next) = self.fixes.pop_front() {
                self.last = next;
            }
        }
        self.last
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sim compass
// ────────────────────────────────────────────────────────────────────────────

/// A simulated compass playing back scripted headings.
pub struct SimCompass {
    enabled: bool,
    script: VecDeque<f32>,
    fallback: f32,
}

impl SimCompass {
    /// A compass that always reports `heading` degrees.
    pub fn constant(heading: f32) -> Box<Self> {
        Box::new(Self {
            enabled: false,
            script: VecDeque::new(),
            fallback: heading,
        })
    }

    /// A compass that plays back `script`, then holds the last heading.
    pub fn scripted(script: Vec<f32>) -> Box<Self> {
        let fallback = script.last().copied().unwrap_or(0.0);
        Box::new(Self {
            enabled: false,
            script: script.into(),
            fallback,
        })
    }
}

impl Compass for SimCompass {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn enable(&mut self) -> Result<(), WayposeError> {
        self.enabled = true;
        Ok(())
    }

    fn true_heading(&mut self) -> f32 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// The fully simulated hardware stack produced by [`SimRig::build`].
pub struct SimStack {
    pub aggregator: SensorAggregator,
    pub location: Box<dyn LocationSource>,
    pub compass: Box<dyn Compass>,
}

/// Builder that assembles a simulated sensor stack for headless tests and
/// the demo binary.
#[derive(Default)]
pub struct SimRig {
    sensors: Vec<Box<dyn SensorSource>>,
    location: Option<SimLocation>,
    compass: Option<Box<dyn Compass>>,
}

impl SimRig {
    /// Create an empty rig builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constant-value simulated sensor.
    pub fn with_sensor(mut self, kind: SensorKind, value: Vec3) -> Self {
        self.sensors.push(SimSensor::constant(kind, value));
        self
    }

    /// Register a custom sensor driver (scripted sims, test doubles).
    pub fn with_sensor_driver(mut self, sensor: Box<dyn SensorSource>) -> Self {
        self.sensors.push(sensor);
        self
    }

    /// Register the full six-channel sensor suite at rest (gravity only).
    pub fn with_idle_sensors(mut self) -> Self {
        let rest = Vec3::new(0.0, -1.0, 0.0);
        self.sensors
            .push(SimSensor::constant(SensorKind::Accelerometer, rest));
        self.sensors
            .push(SimSensor::constant(SensorKind::Gyroscope, Vec3::zero()));
        self.sensors
            .push(SimSensor::constant(SensorKind::Gravity, rest));
        self.sensors
            .push(SimSensor::constant(SensorKind::Attitude, Vec3::zero()));
        self.sensors.push(SimSensor::constant(
            SensorKind::LinearAcceleration,
            Vec3::zero(),
        ));
        self.sensors.push(SimSensor::constant(
            SensorKind::MagneticField,
            Vec3::new(22.0, -4.0, 38.0),
        ));
        self
    }

    /// Use the given simulated location service.
    pub fn with_location(mut self, location: SimLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Use a constant-heading compass.
    pub fn with_heading(mut self, heading: f32) -> Self {
        self.compass = Some(SimCompass::constant(heading));
        self
    }

    /// Use a custom compass driver.
    pub fn with_compass(mut self, compass: Box<dyn Compass>) -> Self {
        self.compass = Some(compass);
        self
    }

    /// Consume the builder and return the assembled [`SimStack`].
    pub fn build(self) -> SimStack {
        let mut aggregator = SensorAggregator::new();
        for sensor in self.sensors {
            aggregator.register(sensor);
        }
        SimStack {
            aggregator,
            location: Box::new(self.location.unwrap_or_default()),
            compass: self.compass.unwrap_or_else(|| SimCompass::constant(0.0)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

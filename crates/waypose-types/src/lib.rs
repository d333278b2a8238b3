//! `waypose-types` – shared data model for the waypose stack.
//!
//! Defines the sensor/location vocabulary exchanged between the HAL, the
//! motion controller, and the presentation layer, plus the global error
//! taxonomy.  Every failure in the system is recoverable and is surfaced to
//! the operator as a [`ControllerStatus`] value; [`WayposeError`] exists for
//! the driver seams and is absorbed where it is detected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod math;

pub use math::{Quaternion, Vec3};

// ────────────────────────────────────────────────────────────────────────────
// Sensors
// ────────────────────────────────────────────────────────────────────────────

/// The sensor channels the aggregator knows how to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Gravity,
    Attitude,
    LinearAcceleration,
    MagneticField,
}

impl SensorKind {
    /// Every kind the aggregator reports on, in display order.
    pub const ALL: [SensorKind; 6] = [
        SensorKind::Accelerometer,
        SensorKind::Gyroscope,
        SensorKind::Gravity,
        SensorKind::Attitude,
        SensorKind::LinearAcceleration,
        SensorKind::MagneticField,
    ];

    /// Short display label, e.g. `"Accel"`.
    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "Accel",
            SensorKind::Gyroscope => "Gyro",
            SensorKind::Gravity => "Gravity",
            SensorKind::Attitude => "Attitude",
            SensorKind::LinearAcceleration => "Linear",
            SensorKind::MagneticField => "Magnet",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One sensor channel's value for the current tick.
///
/// Recomputed every tick by the aggregator and never stored across ticks.
/// Absence is a valid state, not an error: an absent or disabled source
/// yields `available = false` with a zero vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub kind: SensorKind,
    pub vector: Vec3,
    pub available: bool,
}

impl SensorReading {
    /// A reading for a source that is absent or disabled this tick.
    pub fn unavailable(kind: SensorKind) -> Self {
        Self {
            kind,
            vector: Vec3::zero(),
            available: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Location
// ────────────────────────────────────────────────────────────────────────────

/// A raw latitude/longitude sample from the location source.
///
/// An exact `(0, 0)` pair is the platform's way of reporting "no data yet"
/// and is filtered by the controller, never treated as a real position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f32,
    pub longitude: f32,
}

impl PositionFix {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `true` for the exact `(0, 0)` noise reading.
    pub fn is_zero(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// An immutable geographic bounding rectangle gating avatar motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f32,
    pub max_lat: f32,
    pub min_lon: f32,
    pub max_lon: f32,
}

impl GeoBounds {
    pub fn new(min_lat: f32, max_lat: f32, min_lon: f32, max_lon: f32) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Inclusive containment check on all four edges.
    pub fn contains(&self, latitude: f32, longitude: f32) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lon
            && longitude <= self.max_lon
    }
}

impl Default for GeoBounds {
    /// The original deployment rectangle (Tenerife).
    fn default() -> Self {
        Self::new(28.0, 29.0, -17.0, -15.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose
// ────────────────────────────────────────────────────────────────────────────

/// The avatar's position and orientation.
///
/// Recomputed every tick from heading and filtered acceleration while the
/// retained fix is inside bounds; frozen at its last value otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quaternion,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zero(),
            rotation: Quaternion::identity(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller status
// ────────────────────────────────────────────────────────────────────────────

/// Operator-facing state of the controller.  Drives the presentation text;
/// every failure mode in the system ends up here rather than in a panic or
/// a propagated error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControllerStatus {
    /// Initial state before the acquisition sequence has begun.
    Initializing,
    /// Stopping any previous location session before starting a new one.
    Restarting,
    /// Start has been issued to the location source.
    RequestingGps,
    /// Waiting for the source to leave its initialising state.
    ConnectingGps { seconds_left: u8 },
    /// Acquisition timed out or the source reported failure.  Manual
    /// restart required.
    Failed,
    /// The source is running but no data has arrived yet.
    GpsActive,
    /// A nonzero fix has been received.
    SignalOk,
    /// Only `(0, 0)` noise received so far.
    ReceivingZero,
    /// The retained fix is outside the geofence; the pose is frozen.
    OutOfBounds { latitude: f32, longitude: f32 },
}

impl std::fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerStatus::Initializing => write!(f, "Starting up..."),
            ControllerStatus::Restarting => write!(f, "Restarting location service..."),
            ControllerStatus::RequestingGps => write!(f, "Requesting GPS..."),
            ControllerStatus::ConnectingGps { seconds_left } => {
                write!(f, "Connecting... {seconds_left}")
            }
            ControllerStatus::Failed => write!(f, "Failed. Press restart."),
            ControllerStatus::GpsActive => write!(f, "GPS active. Waiting for data..."),
            ControllerStatus::SignalOk => write!(f, "SIGNAL OK"),
            ControllerStatus::ReceivingZero => write!(f, "Receiving (0,0)..."),
            ControllerStatus::OutOfBounds {
                latitude,
                longitude,
            } => write!(f, "OUT OF BOUNDS: {latitude:.2}, {longitude:.2}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Events
// ────────────────────────────────────────────────────────────────────────────

/// Unified event wrapper pushed to the presentation sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"waypose-runtime::control_loop"`
    pub source: String,
    pub payload: EventPayload,
}

impl StatusEvent {
    /// Wrap `payload` with a fresh id and the current UTC timestamp.
    pub fn now(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    StatusChanged(ControllerStatus),
    PoseUpdated(Pose),
    FixAccepted(PositionFix),
    SensorSample(SensorReading),
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Global error type for the driver seams.
///
/// None of these propagate past the component that detects them: the
/// aggregator and controller absorb them and surface a [`ControllerStatus`]
/// instead (sensor absence and GPS failure are non-fatal and recoverable
/// via an explicit restart).
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WayposeError {
    #[error("sensor {kind} is not available")]
    SensorUnavailable { kind: SensorKind },

    #[error("sensor {kind} fault: {details}")]
    SensorFault { kind: SensorKind, details: String },

    #[error("GPS acquisition timed out")]
    GpsTimeout,

    #[error("location service failed: {details}")]
    GpsFailed { details: String },

    #[error("fix ({latitude:.4}, {longitude:.4}) is outside the geofence")]
    OutOfBounds { latitude: f32, longitude: f32 },

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_kind_serialization_roundtrip() {
        for kind in SensorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            let back: SensorKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
    }

    #[test]
    fn sensor_reading_unavailable_is_zeroed() {
        let r = SensorReading::unavailable(SensorKind::Gyroscope);
        assert!(!r.available);
        assert_eq!(r.vector, Vec3::zero());
        assert_eq!(r.kind, SensorKind::Gyroscope);
    }

    #[test]
    fn position_fix_zero_detection() {
        assert!(PositionFix::new(0.0, 0.0).is_zero());
        assert!(!PositionFix::new(0.0, -16.0).is_zero());
        assert!(!PositionFix::new(28.5, 0.0).is_zero());
    }

    #[test]
    fn geo_bounds_contains_is_inclusive() {
        let b = GeoBounds::default();
        assert!(b.contains(28.0, -17.0)); // min/min corner
        assert!(b.contains(29.0, -15.0)); // max/max corner
        assert!(b.contains(28.5, -16.0));
        assert!(!b.contains(27.999, -16.0));
        assert!(!b.contains(28.5, -14.999));
    }

    #[test]
    fn controller_status_roundtrip() {
        let status = ControllerStatus::OutOfBounds {
            latitude: 30.1,
            longitude: -14.2,
        };
        let json = serde_json::to_string(&status).unwrap();
        let back: ControllerStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, back);
    }

    #[test]
    fn controller_status_display_strings() {
        assert_eq!(
            ControllerStatus::ConnectingGps { seconds_left: 7 }.to_string(),
            "Connecting... 7"
        );
        assert_eq!(ControllerStatus::SignalOk.to_string(), "SIGNAL OK");
        assert_eq!(
            ControllerStatus::OutOfBounds {
                latitude: 30.123,
                longitude: -14.456
            }
            .to_string(),
            "OUT OF BOUNDS: 30.12, -14.46"
        );
    }

    #[test]
    fn status_event_roundtrip() {
        let event = StatusEvent::now(
            "waypose-runtime::control_loop",
            EventPayload::StatusChanged(ControllerStatus::SignalOk),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: StatusEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
    }

    #[test]
    fn waypose_error_display() {
        let err = WayposeError::SensorUnavailable {
            kind: SensorKind::MagneticField,
        };
        assert!(err.to_string().contains("Magnet"));

        let err2 = WayposeError::GpsFailed {
            details: "service denied".to_string(),
        };
        assert!(err2.to_string().contains("service denied"));
    }

    #[test]
    fn default_pose_is_origin_identity() {
        let p = Pose::default();
        assert_eq!(p.position, Vec3::zero());
        assert!(p.rotation.angle_to(Quaternion::identity()) < 1e-6);
    }
}

//! [`PresentationSink`] – the observer seam toward the UI.
//!
//! The original system rendered sensor values and status text with
//! immediate-mode GUI calls.  Here the rendering side is entirely external:
//! the control loop pushes [`StatusEvent`]s into whatever sink was injected
//! and never knows how (or whether) they are drawn.

use waypose_types::{SensorReading, StatusEvent};

/// Receives every event the control loop emits, in emission order.
pub trait PresentationSink: Send {
    fn on_event(&mut self, event: &StatusEvent);
}

/// A sink that drops everything (headless operation).
#[derive(Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn on_event(&mut self, _event: &StatusEvent) {}
}

/// A sink that records every event.  Used by tests to assert on the exact
/// stream the loop produced.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<StatusEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for RecordingSink {
    fn on_event(&mut self, event: &StatusEvent) {
        self.events.push(event.clone());
    }
}

/// Render one sensor reading as a display line, e.g.
/// `"Accel: (0.10, -9.80, 0.40)"` or `"Gyro: unavailable"`.
pub fn format_reading(reading: &SensorReading) -> String {
    if reading.available {
        format!(
            "{}: ({:.2}, {:.2}, {:.2})",
            reading.kind.label(),
            reading.vector.x,
            reading.vector.y,
            reading.vector.z
        )
    } else {
        format!("{}: unavailable", reading.kind.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypose_types::{SensorKind, Vec3};

    #[test]
    fn format_available_reading() {
        let r = SensorReading {
            kind: SensorKind::Accelerometer,
            vector: Vec3::new(0.1, -9.8, 0.4),
            available: true,
        };
        assert_eq!(format_reading(&r), "Accel: (0.10, -9.80, 0.40)");
    }

    #[test]
    fn format_unavailable_reading() {
        let r = SensorReading::unavailable(SensorKind::MagneticField);
        assert_eq!(format_reading(&r), "Magnet: unavailable");
    }
}

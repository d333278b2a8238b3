//! `Compass` – true-heading scalar source.

use waypose_types::WayposeError;

/// A compass reporting true heading in degrees clockwise from north.
pub trait Compass: Send + Sync {
    /// `true` once the compass has been enabled.
    fn is_enabled(&self) -> bool;

    /// Enable the compass.  Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`WayposeError::SensorFault`] if the platform has no compass.
    fn enable(&mut self) -> Result<(), WayposeError>;

    /// Current true heading in degrees, `[0, 360)`.  `&mut self` because
    /// platform reads are side-effecting polls.
    fn true_heading(&mut self) -> f32;
}

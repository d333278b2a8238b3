//! Generic `SensorSource` trait for accelerometers, gyroscopes, and any
//! other vector-valued device channel.
//!
//! Platform integrations implement this trait and register themselves with a
//! [`SensorAggregator`][crate::aggregator::SensorAggregator].  The rest of
//! the stack only ever talks to the trait, so the host platform can be
//! swapped without touching the motion controller.

use waypose_types::{SensorKind, Vec3, WayposeError};

/// A single vector-valued sensor channel (accelerometer, gyroscope, …).
///
/// Activation is host-controlled and lazy: a source may report
/// `is_connected() == false` at any time (device unplugged, remote bridge
/// down) and that is a valid, reportable state rather than an error.
pub trait SensorSource: Send + Sync {
    /// Which channel this source feeds.
    fn kind(&self) -> SensorKind;

    /// `true` while the underlying device is present on the platform.
    fn is_connected(&self) -> bool;

    /// `true` once the device has been enabled for sampling.
    fn is_enabled(&self) -> bool;

    /// Ask the platform to enable the device.  Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`WayposeError::SensorFault`] if the platform refuses to
    /// enable the device.
    fn enable(&mut self) -> Result<(), WayposeError>;

    /// Disable the device.  Must be safe to call on an already-disabled or
    /// disconnected source.
    fn disable(&mut self);

    /// Sample the current value.
    ///
    /// # Errors
    ///
    /// Returns [`WayposeError::SensorFault`] when the device is enabled but
    /// the sample cannot be produced.
    fn read(&mut self) -> Result<Vec3, WayposeError>;
}

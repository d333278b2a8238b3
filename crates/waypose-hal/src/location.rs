//! `LocationSource` – the platform location-fix stream.
//!
//! Mirrors the lifecycle a mobile platform exposes: the service is started,
//! spends some time initialising, and then either runs (producing fixes) or
//! fails.  The acquisition state machine in `waypose-control` drives this
//! trait; nothing else starts or stops the service.

use waypose_types::{PositionFix, WayposeError};

/// Lifecycle state reported by the platform location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    /// The service is not running.
    Stopped,
    /// Start has been requested; no fix stream yet.
    Initializing,
    /// The service is producing fixes.
    Running,
    /// The service failed to start or died.
    Failed,
}

/// A host location service producing latitude/longitude fixes.
///
/// `status` and `last_fix` take `&mut self` because reading a platform
/// device is a side-effecting poll (drivers may drain an internal queue).
pub trait LocationSource: Send + Sync {
    /// Current service state.  Polled once per one-second lifecycle tick.
    fn status(&mut self) -> LocationStatus;

    /// Request service start.  Idempotent while already running.
    ///
    /// # Errors
    ///
    /// Returns [`WayposeError::GpsFailed`] when the platform refuses the
    /// request outright (e.g. permission denied).
    fn start(&mut self) -> Result<(), WayposeError>;

    /// Stop the service.  Must be safe to call when already stopped.
    fn stop(&mut self);

    /// The most recent fix.  Platforms report `(0, 0)` before real data
    /// arrives; the controller's zero filter handles that case.
    fn last_fix(&mut self) -> PositionFix;
}

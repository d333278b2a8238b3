//! `waypose-control` – the geofenced motion controller.
//!
//! Turns the raw HAL streams (location fixes, accelerometer, compass) into
//! a smoothed avatar pose, gated by a geographic bounding rectangle.
//!
//! # Modules
//!
//! - [`fix_filter`] – [`FixFilter`]: sticky last-good-value filter that
//!   discards `(0, 0)` noise fixes.
//! - [`geofence`] – [`Geofence`]: inclusive rectangle gate; outside it the
//!   pose is frozen, hard.
//! - [`lifecycle`] – [`GpsLifecycle`]: tick-driven acquisition state
//!   machine (stop → settle → start → 20 s countdown → active/failed) with
//!   atomic restart.
//! - [`motion`] – [`MotionController`]: per-tick pose integration (heading
//!   slerp + dead-zoned forward speed) behind the filter and the fence.
//!
//! Nothing in this crate returns an error to its caller at the tick level:
//! every failure mode is a [`ControllerStatus`][waypose_types::ControllerStatus]
//! value, and a manual restart is always available.

pub mod fix_filter;
pub mod geofence;
pub mod lifecycle;
pub mod motion;

pub use fix_filter::{FixFilter, FixOutcome};
pub use geofence::Geofence;
pub use lifecycle::GpsLifecycle;
pub use motion::{MotionConfig, MotionController};

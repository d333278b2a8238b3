//! `waypose-hal` – platform sensor abstraction layer.
//!
//! The host platform (device bridge, game engine, OS services) is reached
//! only through the capability traits defined here, so the controller and
//! runtime never see a platform API and every driver can be replaced by an
//! in-process sim for headless testing.
//!
//! # Modules
//!
//! - [`sensor`] – [`SensorSource`]: one vector-valued device channel with
//!   host-controlled enable/disable.
//! - [`location`] – [`LocationSource`]: the start/stop location-fix stream
//!   and its [`LocationStatus`] lifecycle states.
//! - [`compass`] – [`Compass`]: the true-heading scalar source.
//! - [`aggregator`] – [`SensorAggregator`]: kind-keyed driver registry that
//!   polls every channel once per tick, lazily enabling sources and
//!   reporting absence as an unavailable reading rather than an error.
//! - [`sim`] – scripted in-process drivers plus the [`SimRig`][sim::SimRig]
//!   builder for CI and the demo binary.

pub mod aggregator;
pub mod compass;
pub mod location;
pub mod sensor;
pub mod sim;

pub use aggregator::SensorAggregator;
pub use compass::Compass;
pub use location::{LocationSource, LocationStatus};
pub use sensor::SensorSource;

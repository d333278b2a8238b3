//! `waypose-runtime` – tick-loop orchestration.
//!
//! Owns one avatar session end to end: the sensor aggregator, the location
//! and compass sources, the motion controller, and the presentation sink.
//! An external driver (frame callback, timer, test harness) calls
//! [`ControlLoop::tick`][control_loop::ControlLoop::tick] with the elapsed
//! time; everything below that is single-threaded and cooperative.
//!
//! # Modules
//!
//! - [`control_loop`] – [`ControlLoop`][control_loop::ControlLoop]: the
//!   per-tick orchestrator (advance GPS → poll sensors → update pose →
//!   notify the sink), plus the manual-restart trigger and idempotent
//!   shutdown.
//! - [`presentation`] – [`PresentationSink`][presentation::PresentationSink]:
//!   the observer seam the UI implements, with [`NullSink`][presentation::NullSink]
//!   and [`RecordingSink`][presentation::RecordingSink] doubles and the
//!   sensor display-string formatter.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: console
//!   `tracing` subscriber with env-filter and optional JSON output.

pub mod control_loop;
pub mod presentation;
pub mod telemetry;

pub use control_loop::ControlLoop;
pub use presentation::{NullSink, PresentationSink, RecordingSink, format_reading};
pub use telemetry::init_tracing;

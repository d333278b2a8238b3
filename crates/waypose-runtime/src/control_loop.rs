//! [`ControlLoop`] – the per-tick orchestrator.
//!
//! Wires the HAL to the motion controller and the presentation sink.  Each
//! [`tick`][ControlLoop::tick]:
//!
//! 1. advances the GPS acquisition state machine by the elapsed time;
//! 2. polls every sensor channel through the [`SensorAggregator`];
//! 3. feeds the latest fix, accelerometer reading, and compass heading into
//!    the [`MotionController`];
//! 4. pushes sensor samples, status transitions, accepted fixes, and the
//!    pose to the injected [`PresentationSink`].
//!
//! The loop itself is driven externally (a frame callback, a timer, a test
//! harness); there is no thread and no scheduler in here, just one logical
//! tick at a time.

use tracing::{debug, info};
use waypose_control::{MotionConfig, MotionController};
use waypose_hal::{Compass, LocationSource, SensorAggregator};
use waypose_types::{ControllerStatus, EventPayload, PositionFix, SensorKind, StatusEvent};

use crate::presentation::PresentationSink;

/// Event source tag stamped on every emitted [`StatusEvent`].
const EVENT_SOURCE: &str = "waypose-runtime::control_loop";

/// Owns the full stack for one avatar session.
pub struct ControlLoop {
    aggregator: SensorAggregator,
    location: Box<dyn LocationSource>,
    compass: Box<dyn Compass>,
    controller: MotionController,
    sink: Box<dyn PresentationSink>,
    last_status: Option<ControllerStatus>,
    last_fix: Option<PositionFix>,
}

impl ControlLoop {
    /// Assemble a loop from its collaborators.  Call [`start`][Self::start]
    /// before the first tick.
    pub fn new(
        aggregator: SensorAggregator,
        location: Box<dyn LocationSource>,
        compass: Box<dyn Compass>,
        config: MotionConfig,
        sink: Box<dyn PresentationSink>,
    ) -> Self {
        Self {
            aggregator,
            location,
            compass,
            controller: MotionController::new(config),
            sink,
            last_status: None,
            last_fix: None,
        }
    }

    /// Enable the compass and begin GPS acquisition.
    pub fn start(&mut self) {
        // A missing compass is non-fatal: heading just stays at its last
        // polled value (0 for a dead device).
        if let Err(e) = self.compass.enable() {
            debug!(error = %e, "compass enable refused");
        }
        self.controller.start(self.location.as_mut());
        self.emit_status();
    }

    /// Manual restart trigger (the operator's restart button).
    pub fn restart(&mut self) {
        info!("manual restart triggered");
        self.controller.restart(self.location.as_mut());
        self.emit_status();
    }

    /// Advance the whole stack by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.controller.advance_gps(self.location.as_mut(), dt);

        let readings = self.aggregator.poll();
        for reading in readings.values() {
            self.sink
                .on_event(&StatusEvent::now(EVENT_SOURCE, EventPayload::SensorSample(*reading)));
        }

        let fix = self.location.last_fix();
        let heading = self.compass.true_heading();
        let accel = readings[&SensorKind::Accelerometer];
        self.controller.update(fix, &accel, heading, dt);

        self.emit_status();
        if self.controller.last_fix() != self.last_fix {
            self.last_fix = self.controller.last_fix();
            if let Some(fix) = self.last_fix {
                self.sink
                    .on_event(&StatusEvent::now(EVENT_SOURCE, EventPayload::FixAccepted(fix)));
            }
        }
        self.sink.on_event(&StatusEvent::now(
            EVENT_SOURCE,
            EventPayload::PoseUpdated(self.controller.pose()),
        ));
    }

    /// Stop the location service and disable every sensor.  Safe to call
    /// repeatedly.
    pub fn shutdown(&mut self) {
        info!("control loop shutting down");
        self.aggregator.release_all();
        self.location.stop();
    }

    /// Latest operator-facing status.
    pub fn status(&self) -> ControllerStatus {
        self.controller.status()
    }

    /// Latest avatar pose.
    pub fn pose(&self) -> waypose_types::Pose {
        self.controller.pose()
    }

    /// Latest retained fix, if any valid fix has arrived.
    pub fn last_fix(&self) -> Option<PositionFix> {
        self.controller.last_fix()
    }

    fn emit_status(&mut self) {
        let status = self.controller.status();
        if self.last_status != Some(status) {
            info!(status = %status, "controller status changed");
            self.last_status = Some(status);
            self.sink.on_event(&StatusEvent::now(
                EVENT_SOURCE,
                EventPayload::StatusChanged(status),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use waypose_hal::sim::{SimLocation, SimRig};
    use waypose_types::{Pose, Vec3};

    /// A sink handle the test can keep while the loop owns the sink.
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<StatusEvent>>>);

    impl PresentationSink for SharedSink {
        fn on_event(&mut self, event: &StatusEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    impl SharedSink {
        fn statuses(&self) -> Vec<ControllerStatus> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e.payload {
                    EventPayload::StatusChanged(s) => Some(s),
                    _ => None,
                })
                .collect()
        }

        fn accepted_fixes(&self) -> Vec<PositionFix> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e.payload {
                    EventPayload::FixAccepted(f) => Some(f),
                    _ => None,
                })
                .collect()
        }

        fn last_pose(&self) -> Option<Pose> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find_map(|e| match e.payload {
                    EventPayload::PoseUpdated(p) => Some(p),
                    _ => None,
                })
        }
    }

    fn make_loop(location: SimLocation, heading: f32, accel_z: f32) -> (ControlLoop, SharedSink) {
        let stack = SimRig::new()
            .with_sensor(SensorKind::Accelerometer, Vec3::new(0.0, -1.0, accel_z))
            .with_location(location)
            .with_heading(heading)
            .build();
        let sink = SharedSink::default();
        let lp = ControlLoop::new(
            stack.aggregator,
            stack.location,
            stack.compass,
            MotionConfig::default(),
            Box::new(sink.clone()),
        );
        (lp, sink)
    }

    #[test]
    fn acquisition_status_sequence_reaches_signal_ok() {
        let location = SimLocation::new()
            .with_init_delay(1)
            .with_fix(PositionFix::new(28.5, -16.0));
        let (mut lp, sink) = make_loop(location, 0.0, 0.0);

        lp.start();
        for _ in 0..6 {
            lp.tick(1.0);
        }

        let statuses = sink.statuses();
        assert_eq!(statuses[0], ControllerStatus::Restarting);
        assert!(statuses.contains(&ControllerStatus::RequestingGps));
        assert!(
            statuses
                .iter()
                .any(|s| matches!(s, ControllerStatus::ConnectingGps { .. }))
        );
        assert_eq!(*statuses.last().unwrap(), ControllerStatus::SignalOk);
        assert_eq!(
            sink.accepted_fixes(),
            vec![PositionFix::new(28.5, -16.0)]
        );
    }

    #[test]
    fn status_events_are_emitted_only_on_change() {
        let location = SimLocation::new().with_fix(PositionFix::new(28.5, -16.0));
        let (mut lp, sink) = make_loop(location, 0.0, 0.0);

        lp.start();
        for _ in 0..20 {
            lp.tick(1.0);
        }
        let statuses = sink.statuses();
        // SignalOk appears once, not once per tick.
        let ok_count = statuses
            .iter()
            .filter(|s| **s == ControllerStatus::SignalOk)
            .count();
        assert_eq!(ok_count, 1);
    }

    #[test]
    fn stuck_gps_surfaces_failed_and_restart_recovers_status() {
        let location = SimLocation::new().stuck();
        let (mut lp, sink) = make_loop(location, 0.0, 0.0);

        lp.start();
        for _ in 0..25 {
            lp.tick(1.0);
        }
        assert_eq!(lp.status(), ControllerStatus::Failed);

        lp.restart();
        assert_eq!(lp.status(), ControllerStatus::Restarting);
        assert!(sink.statuses().contains(&ControllerStatus::Failed));
    }

    #[test]
    fn pose_events_track_motion_inside_bounds() {
        let location = SimLocation::new().with_fix(PositionFix::new(28.5, -16.0));
        let (mut lp, sink) = make_loop(location, 0.0, -0.8);

        lp.start();
        for _ in 0..3 {
            lp.tick(1.0); // acquisition
        }
        for _ in 0..10 {
            lp.tick(0.1); // motion ticks
        }

        let pose = sink.last_pose().unwrap();
        assert!(pose.position.length() > 0.0, "avatar should have moved");
    }

    #[test]
    fn out_of_bounds_fix_freezes_emitted_pose() {
        let location = SimLocation::new().with_fixes([
            PositionFix::new(28.5, -16.0),
            PositionFix::new(35.0, -16.0),
        ]);
        let (mut lp, sink) = make_loop(location, 0.0, -0.8);

        lp.start();
        for _ in 0..3 {
            lp.tick(1.0);
        }
        lp.tick(0.1); // consumes the outside fix: freezes
        lp.tick(0.1);
        let frozen = sink.last_pose().unwrap();
        for _ in 0..5 {
            lp.tick(0.1);
            assert_eq!(sink.last_pose().unwrap(), frozen);
        }
        assert!(matches!(
            lp.status(),
            ControllerStatus::OutOfBounds { .. }
        ));
    }

    #[test]
    fn sensor_samples_are_emitted_every_tick() {
        let (mut lp, sink) = make_loop(SimLocation::new(), 0.0, 0.0);
        lp.start();
        lp.tick(0.1);

        let samples = sink
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e.payload, EventPayload::SensorSample(_)))
            .count();
        assert_eq!(samples, SensorKind::ALL.len());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (mut lp, _) = make_loop(SimLocation::new(), 0.0, 0.0);
        lp.start();
        lp.tick(0.1);
        lp.shutdown();
        lp.shutdown(); // must be safe to repeat
    }
}

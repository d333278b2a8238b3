//! [`SensorAggregator`] – central sensor registry and per-tick poller.
//!
//! The aggregator stores one [`SensorSource`] driver per [`SensorKind`].
//! Each call to [`SensorAggregator::poll`] walks every known kind, lazily
//! enabling sources that have just appeared (remote bridges connect devices
//! at unpredictable times) and reporting a zero-vector, unavailable reading
//! for anything absent or disabled.  Absence is never an error: a missing
//! gyroscope produces `available = false`, not a fault.
//!
//! Read failures from a live source are absorbed here and logged; the
//! reading for that kind is simply unavailable for the tick.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};
use waypose_types::{SensorKind, SensorReading};

use crate::sensor::SensorSource;

/// Kind-keyed sensor driver registry.
///
/// Construct with [`SensorAggregator::new`], register drivers, then call
/// [`SensorAggregator::poll`] once per tick.  [`release_all`] disables
/// everything on teardown and is safe to call repeatedly.
///
/// [`release_all`]: SensorAggregator::release_all
#[derive(Default)]
pub struct SensorAggregator {
    sources: HashMap<SensorKind, Box<dyn SensorSource>>,
}

impl SensorAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sensor driver.  Any previously registered driver for the
    /// same kind is replaced.
    pub fn register(&mut self, source: Box<dyn SensorSource>) {
        self.sources.insert(source.kind(), source);
    }

    /// `true` if a driver is registered for `kind`, regardless of whether
    /// the underlying device is currently connected.
    pub fn has_source(&self, kind: SensorKind) -> bool {
        self.sources.contains_key(&kind)
    }

    /// Poll every known sensor kind and return this tick's readings.
    ///
    /// For each kind: a connected-but-disabled source is enabled first
    /// (idempotent; an enable refusal is logged and the source stays
    /// unavailable), then sampled.  Kinds without a registered driver, with
    /// a disconnected device, or whose read fails all report
    /// [`SensorReading::unavailable`].
    pub fn poll(&mut self) -> BTreeMap<SensorKind, SensorReading> {
        let mut readings = BTreeMap::new();
        for kind in SensorKind::ALL {
            readings.insert(kind, self.poll_one(kind));
        }
        readings
    }

    /// Disable every enabled sensor.  Safe to call multiple times and on
    /// disconnected sources.
    pub fn release_all(&mut self) {
        for source in self.sources.values_mut() {
            if source.is_enabled() {
                debug!(sensor = %source.kind(), "disabling sensor");
                source.disable();
            }
        }
    }

    fn poll_one(&mut self, kind: SensorKind) -> SensorReading {
        let Some(source) = self.sources.get_mut(&kind) else {
            return SensorReading::unavailable(kind);
        };
        if !source.is_connected() {
            return SensorReading::unavailable(kind);
        }
        // Lazy activation: remote bridges attach devices mid-session, so we
        // retry the enable on every poll until it sticks.
        if !source.is_enabled() {
            if let Err(e) = source.enable() {
                debug!(sensor = %kind, error = %e, "sensor enable refused");
                return SensorReading::unavailable(kind);
            }
        }
        match source.read() {
            Ok(vector) => SensorReading {
                kind,
                vector,
                available: true,
            },
            Err(e) => {
                warn!(sensor = %kind, error = %e, "sensor read failed");
                SensorReading::unavailable(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypose_types::{Vec3, WayposeError};

    // ------------------------------------------------------------------
    // Test double
    // ------------------------------------------------------------------

    struct FlakySensor {
        kind: SensorKind,
        connected: bool,
        enabled: bool,
        refuse_enable: bool,
        fail_reads: bool,
        enable_calls: usize,
        value: Vec3,
    }

    impl FlakySensor {
        fn new(kind: SensorKind, value: Vec3) -> Box<Self> {
            Box::new(Self {
                kind,
                connected: true,
                enabled: false,
                refuse_enable: false,
                fail_reads: false,
                enable_calls: 0,
                value,
            })
        }
    }

    impl SensorSource for FlakySensor {
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
            self.enable_calls += 1;
            if self.refuse_enable {
                return Err(WayposeError::SensorFault {
                    kind: self.kind,
                    details: "enable refused".to_string(),
                });
            }
            self.enabled = true;
            Ok(())
        }
        fn disable(&mut self) {
            self.enabled = false;
        }
        fn read(&mut self) -> Result<Vec3, WayposeError> {
            if self.fail_reads {
                return Err(WayposeError::SensorFault {
                    kind: self.kind,
                    details: "bus timeout".to_string(),
                });
            }
            Ok(self.value)
        }
    }

    // ------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------

    #[test]
    fn poll_reports_every_known_kind() {
        let mut agg = SensorAggregator::new();
        let readings = agg.poll();
        assert_eq!(readings.len(), SensorKind::ALL.len());
        assert!(readings.values().all(|r| !r.available));
    }

    #[test]
    fn poll_enables_and_reads_registered_source() {
        let mut agg = SensorAggregator::new();
        agg.register(FlakySensor::new(
            SensorKind::Accelerometer,
            Vec3::new(0.1, -9.8, 0.4),
        ));

        let readings = agg.poll();
        let accel = &readings[&SensorKind::Accelerometer];
        assert!(accel.available);
        assert!((accel.vector.z - 0.4).abs() < f32::EPSILON);
        // Other kinds still report as unavailable.
        assert!(!readings[&SensorKind::Gyroscope].available);
    }

    #[test]
    fn enable_is_attempted_once_per_connected_disabled_source() {
        let mut agg = SensorAggregator::new();
        agg.register(FlakySensor::new(SensorKind::Gyroscope, Vec3::zero()));

        agg.poll();
        agg.poll();
        agg.poll();

        // Enabled on the first poll; no re-enable churn afterwards.
        let src = agg.sources.get(&SensorKind::Gyroscope).unwrap();
        assert!(src.is_enabled());
    }

    #[test]
    fn disconnected_source_is_unavailable_without_enable_attempt() {
        let mut sensor = FlakySensor::new(SensorKind::Gravity, Vec3::zero());
        sensor.connected = false;
        let mut agg = SensorAggregator::new();
        agg.register(sensor);

        let readings = agg.poll();
        assert!(!readings[&SensorKind::Gravity].available);
    }

    #[test]
    fn enable_refusal_is_absorbed() {
        let mut sensor = FlakySensor::new(SensorKind::Attitude, Vec3::zero());
        sensor.refuse_enable = true;
        let mut agg = SensorAggregator::new();
        agg.register(sensor);

        let readings = agg.poll();
        assert!(!readings[&SensorKind::Attitude].available);
    }

    #[test]
    fn read_failure_is_absorbed_as_unavailable() {
        let mut sensor = FlakySensor::new(SensorKind::MagneticField, Vec3::new(1.0, 2.0, 3.0));
        sensor.fail_reads = true;
        let mut agg = SensorAggregator::new();
        agg.register(sensor);

        let readings = agg.poll();
        let mag = &readings[&SensorKind::MagneticField];
        assert!(!mag.available);
        assert_eq!(mag.vector, Vec3::zero());
    }

    #[test]
    fn release_all_disables_and_is_idempotent() {
        let mut agg = SensorAggregator::new();
        agg.register(FlakySensor::new(SensorKind::Accelerometer, Vec3::zero()));
        agg.register(FlakySensor::new(SensorKind::Gyroscope, Vec3::zero()));
        agg.poll();

        agg.release_all();
        agg.release_all(); // must be safe to repeat
        assert!(agg.sources.values().all(|s| !s.is_enabled()));
    }

    #[test]
    fn re_registering_replaces_old_driver() {
        let mut agg = SensorAggregator::new();
        agg.register(FlakySensor::new(
            SensorKind::Accelerometer,
            Vec3::new(0.0, 0.0, 1.0),
        ));
        agg.register(FlakySensor::new(
            SensorKind::Accelerometer,
            Vec3::new(0.0, 0.0, 2.0),
        ));

        let readings = agg.poll();
        assert!((readings[&SensorKind::Accelerometer].vector.z - 2.0).abs() < f32::EPSILON);
    }
}

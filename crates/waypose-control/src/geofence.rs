//! [`Geofence`] – hard geographic gate on avatar motion.
//!
//! A fix outside the configured [`GeoBounds`] rectangle suppresses all pose
//! updates until a fix inside the rectangle arrives.  This is a hard gate,
//! not a soft decay: the pose freezes at its last value.

use waypose_types::{GeoBounds, PositionFix, WayposeError};

/// Inclusive rectangular containment check over a [`GeoBounds`].
#[derive(Debug, Clone, Copy)]
pub struct Geofence {
    bounds: GeoBounds,
}

impl Geofence {
    pub fn new(bounds: GeoBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// `true` when `fix` lies inside the rectangle (edges included).
    pub fn contains(&self, fix: &PositionFix) -> bool {
        self.bounds.contains(fix.latitude, fix.longitude)
    }

    /// Validate `fix` against the rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`WayposeError::OutOfBounds`] carrying the offending
    /// coordinates when the fix lies outside.
    pub fn check(&self, fix: &PositionFix) -> Result<(), WayposeError> {
        if self.contains(fix) {
            Ok(())
        } else {
            Err(WayposeError::OutOfBounds {
                latitude: fix.latitude,
                longitude: fix.longitude,
            })
        }
    }
}

impl Default for Geofence {
    fn default() -> Self {
        Self::new(GeoBounds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fence() -> Geofence {
        Geofence::new(GeoBounds::new(28.0, 29.0, -17.0, -15.0))
    }

    #[test]
    fn inside_passes() {
        assert!(fence().check(&PositionFix::new(28.5, -16.0)).is_ok());
    }

    #[test]
    fn edges_are_inclusive() {
        let f = fence();
        assert!(f.contains(&PositionFix::new(28.0, -17.0)));
        assert!(f.contains(&PositionFix::new(29.0, -15.0)));
        assert!(f.contains(&PositionFix::new(28.0, -15.0)));
        assert!(f.contains(&PositionFix::new(29.0, -17.0)));
    }

    #[test]
    fn outside_each_edge_is_rejected() {
        let f = fence();
        for fix in [
            PositionFix::new(27.99, -16.0),
            PositionFix::new(29.01, -16.0),
            PositionFix::new(28.5, -17.01),
            PositionFix::new(28.5, -14.99),
        ] {
            assert!(!f.contains(&fix));
        }
    }

    #[test]
    fn check_error_carries_coordinates() {
        let err = fence().check(&PositionFix::new(40.4, -3.7)).unwrap_err();
        match err {
            WayposeError::OutOfBounds {
                latitude,
                longitude,
            } => {
                assert!((latitude - 40.4).abs() < f32::EPSILON);
                assert!((longitude - (-3.7)).abs() < f32::EPSILON);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

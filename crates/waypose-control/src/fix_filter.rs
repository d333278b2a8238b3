//! [`FixFilter`] – sticky last-good-value filter for location fixes.
//!
//! Mobile platforms report an exact `(0, 0)` fix while the location stream
//! is warming up (and some remote bridges emit it intermittently even after
//! real data has arrived).  The filter discards those readings so that a
//! known-good fix is never overwritten by noise.
//!
//! The first nonzero fix is trusted permanently; there is no outlier
//! rejection beyond the zero check.

use waypose_types::PositionFix;

/// Outcome of feeding one raw fix through the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    /// Nonzero fix accepted and retained.
    Accepted,
    /// `(0, 0)` discarded; the previously retained fix stands.
    ZeroDiscarded,
    /// `(0, 0)` received and no valid fix has ever arrived.
    NoFixYet,
}

/// Retains the last valid (nonzero) fix across ticks.
#[derive(Debug, Default)]
pub struct FixFilter {
    last_valid: Option<PositionFix>,
}

impl FixFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw fix through the filter.
    pub fn submit(&mut self, fix: PositionFix) -> FixOutcome {
        if !fix.is_zero() {
            self.last_valid = Some(fix);
            FixOutcome::Accepted
        } else if self.last_valid.is_some() {
            FixOutcome::ZeroDiscarded
        } else {
            FixOutcome::NoFixYet
        }
    }

    /// The retained fix, if any valid fix has ever been received.
    pub fn last_valid(&self) -> Option<PositionFix> {
        self.last_valid
    }

    /// `true` once at least one valid fix has been retained.
    pub fn has_fix(&self) -> bool {
        self.last_valid.is_some()
    }
}

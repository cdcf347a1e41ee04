//! Residual distance to directional pulse length.

use std::time::Duration;

use crate::channel::Direction;

/// Seconds of directional pulse per percentage point. Always positive and
/// finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CalibrationConstant(f64);

impl CalibrationConstant {
    pub fn new(seconds_per_percent: f64) -> Option<Self> {
        (seconds_per_percent.is_finite() && seconds_per_percent > 0.0)
            .then_some(Self(seconds_per_percent))
    }

    #[inline]
    pub fn seconds_per_percent(self) -> f64 {
        self.0
    }
}

impl Default for CalibrationConstant {
    fn default() -> Self {
        Self(lift_config::DEFAULT_SECONDS_PER_PERCENT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalPulse {
    pub direction: Direction,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DurationEstimator {
    calibration: CalibrationConstant,
}

impl DurationEstimator {
    pub fn new(calibration: CalibrationConstant) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> CalibrationConstant {
        self.calibration
    }

    /// `None` when there is nothing to cover.
    pub fn estimate(&self, residual: i16) -> Option<DirectionalPulse> {
        let direction = match residual {
            0 => return None,
            r if r > 0 => Direction::Up,
            _ => Direction::Down,
        };
        let secs = f64::from(residual.unsigned_abs()) * self.calibration.seconds_per_percent();
        Some(DirectionalPulse {
            direction,
            // saturates; the pulse ceiling rejects anything this long
            duration: Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX),
        })
    }
}

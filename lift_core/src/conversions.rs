//! Conversions from `lift_config` schema types to `lift_core` runtime types.

use std::time::Duration;

use crate::channel::{ChannelMap, ChannelMapError};
use crate::config::ControllerCfg;
use crate::error::BuildError;
use crate::estimate::CalibrationConstant;

// ── ControllerCfg ────────────────────────────────────────────────────────────

impl TryFrom<&lift_config::TimingCfg> for ControllerCfg {
    type Error = BuildError;

    fn try_from(t: &lift_config::TimingCfg) -> Result<Self, Self::Error> {
        let calibration = CalibrationConstant::new(t.seconds_per_percent).ok_or(
            BuildError::InvalidConfig("timing.seconds_per_percent must be positive"),
        )?;
        Ok(Self {
            calibration,
            preset_press: Duration::from_millis(t.preset_press_ms),
            max_pulse: (t.max_pulse_ms > 0).then(|| Duration::from_millis(t.max_pulse_ms)),
        })
    }
}

impl TryFrom<&lift_config::Config> for ControllerCfg {
    type Error = BuildError;

    fn try_from(c: &lift_config::Config) -> Result<Self, Self::Error> {
        Self::try_from(&c.timing)
    }
}

impl ControllerCfg {
    /// Replace the calibration constant with one fitted from travel runs.
    pub fn with_travel(mut self, travel: &lift_config::TravelCalibration) -> Result<Self, BuildError> {
        self.calibration = CalibrationConstant::new(travel.seconds_per_percent).ok_or(
            BuildError::InvalidConfig("travel calibration must be positive"),
        )?;
        Ok(self)
    }
}

// ── ChannelMap ───────────────────────────────────────────────────────────────

impl TryFrom<&lift_config::Config> for ChannelMap {
    type Error = ChannelMapError;

    fn try_from(c: &lift_config::Config) -> Result<Self, Self::Error> {
        ChannelMap::from_names(c.channels.iter().map(|(name, pin)| (name.as_str(), *pin)))
    }
}

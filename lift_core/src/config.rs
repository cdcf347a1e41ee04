//! Runtime configuration for `ElevationController`.
//!
//! Separate from the TOML schema in `lift_config`; see `conversions` for the
//! mapping.

use std::time::Duration;

use crate::estimate::CalibrationConstant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerCfg {
    /// Seconds of `up`/`down` per percentage point.
    pub calibration: CalibrationConstant,
    /// Hold time for a preset button.
    pub preset_press: Duration,
    /// Reject plans whose directional pulse would run longer than this.
    /// `None` disables the ceiling.
    pub max_pulse: Option<Duration>,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            calibration: CalibrationConstant::default(),
            preset_press: Duration::from_millis(125),
            max_pulse: Some(Duration::from_secs(5)),
        }
    }
}

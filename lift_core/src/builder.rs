//! Builder for `ElevationController`.
//!
//! Driver and channel map are required; everything else has rig defaults.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;

use lift_traits::clock::{Clock, MonotonicClock};
use lift_traits::OutputDriver;

use crate::actuator::{DirectionalActuator, PresetActuator};
use crate::channel::ChannelMap;
use crate::config::ControllerCfg;
use crate::controller::ElevationController;
use crate::error::BuildError;
use crate::estimate::DurationEstimator;

pub struct ControllerBuilder<D> {
    driver: Option<D>,
    channels: Option<ChannelMap>,
    cfg: ControllerCfg,
    cancel: Option<Arc<AtomicBool>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl<D> Default for ControllerBuilder<D> {
    fn default() -> Self {
        Self {
            driver: None,
            channels: None,
            cfg: ControllerCfg::default(),
            cancel: None,
            clock: None,
        }
    }
}

impl<D> core::fmt::Debug for ControllerBuilder<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerBuilder")
            .field("driver", &self.driver.is_some())
            .field("channels", &self.channels)
            .field("cfg", &self.cfg)
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl<D: OutputDriver> ControllerBuilder<D> {
    pub fn with_driver(mut self, driver: D) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_channels(mut self, channels: ChannelMap) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn with_config(mut self, cfg: ControllerCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Checked between pulses; once set, remaining pulses are skipped.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Clock for gaps between pulses during a channel walk.
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> Result<ElevationController<D>, BuildError> {
        let driver = self.driver.ok_or(BuildError::MissingDriver)?;
        let channels = self
            .channels
            .filter(|c| !c.is_empty())
            .ok_or(BuildError::MissingChannels)?;
        if self.cfg.preset_press.is_zero() {
            return Err(BuildError::InvalidConfig("preset press duration must be > 0"));
        }
        if self.cfg.max_pulse.is_some_and(|m| m.is_zero()) {
            return Err(BuildError::InvalidConfig("max pulse ceiling must be > 0"));
        }

        Ok(ElevationController {
            rig: Mutex::new(driver),
            channels,
            preset: PresetActuator::new(self.cfg.preset_press),
            estimator: DurationEstimator::new(self.cfg.calibration),
            directional: DirectionalActuator,
            max_pulse: self.cfg.max_pulse,
            cancel: self.cancel,
            clock: self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new())),
        })
    }
}

//! Output drivers for the lift's preset and direction lines.
//!
//! `SimulatedDriver` is always available; `GpioDriver` needs the `hardware`
//! feature on Linux.
pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use gpio::GpioDriver;

use std::collections::BTreeMap;
use std::time::Duration;

use lift_traits::{Clock, DriverResult, MonotonicClock, OutputDriver};
use tracing::{debug, warn};

use crate::error::HwError;

/// Simulated outputs: tracks asserted state per channel and holds pulses on
/// the injected clock.
pub struct SimulatedDriver<C: Clock = MonotonicClock> {
    lines: BTreeMap<String, bool>,
    clock: C,
    unavailable: Option<String>,
    pulses: usize,
}

impl SimulatedDriver<MonotonicClock> {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_clock(channels, MonotonicClock::new())
    }
}

impl<C: Clock> SimulatedDriver<C> {
    pub fn with_clock<I, S>(channels: I, clock: C) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: channels.into_iter().map(|c| (c.into(), false)).collect(),
            clock,
            unavailable: None,
            pulses: 0,
        }
    }

    /// Make every later call fail as if the GPIO chip could not be reached.
    pub fn fail_with(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    pub fn is_asserted(&self, channel: &str) -> bool {
        self.lines.get(channel).copied().unwrap_or(false)
    }

    /// Completed pulses since construction.
    pub fn pulse_count(&self) -> usize {
        self.pulses
    }

    fn line(&mut self, channel: &str) -> Result<&mut bool, HwError> {
        if let Some(reason) = &self.unavailable {
            return Err(HwError::Unavailable(reason.clone()));
        }
        self.lines
            .get_mut(channel)
            .ok_or_else(|| HwError::UnknownChannel(channel.to_string()))
    }

    fn other_asserted(&self, channel: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|(name, on)| **on && name.as_str() != channel)
            .map(|(name, _)| name.as_str())
    }
}

impl<C: Clock> OutputDriver for SimulatedDriver<C> {
    fn pulse(&mut self, channel: &str, duration: Duration) -> DriverResult {
        *self.line(channel)? = true;
        if let Some(other) = self.other_asserted(channel) {
            warn!(channel, other, "overlapping outputs (simulated)");
        }
        debug!(
            channel,
            ms = duration.as_millis() as u64,
            "pulse (simulated)"
        );
        self.clock.sleep(duration);
        *self.line(channel)? = false;
        self.pulses += 1;
        Ok(())
    }

    fn set(&mut self, channel: &str, asserted: bool) -> DriverResult {
        *self.line(channel)? = asserted;
        debug!(channel, asserted, "set (simulated)");
        Ok(())
    }

    fn release_all(&mut self) -> DriverResult {
        for on in self.lines.values_mut() {
            *on = false;
        }
        Ok(())
    }
}

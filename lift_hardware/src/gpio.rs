use std::collections::BTreeMap;
use std::time::Duration;

use lift_traits::{Clock, DriverResult, MonotonicClock, OutputDriver};
use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, trace, warn};

use crate::error::{HwError, Result};

/// Raspberry Pi outputs driving the optocouplers, one pin per channel.
///
/// Pins idle low. Dropping the driver pulls every pin low before rppal
/// returns the lines to inputs.
pub struct GpioDriver<C: Clock = MonotonicClock> {
    pins: BTreeMap<String, OutputPin>,
    clock: C,
}

impl GpioDriver<MonotonicClock> {
    pub fn open(channels: impl IntoIterator<Item = (String, u8)>) -> Result<Self> {
        Self::open_with_clock(channels, MonotonicClock::new())
    }
}

impl<C: Clock> GpioDriver<C> {
    pub fn open_with_clock(
        channels: impl IntoIterator<Item = (String, u8)>,
        clock: C,
    ) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Unavailable(format!("open gpio: {e}")))?;
        let mut pins = BTreeMap::new();
        for (name, bcm) in channels {
            let pin = gpio
                .get(bcm)
                .map_err(|e| HwError::Gpio(format!("claim pin {bcm} for {name}: {e}")))?
                .into_output_low();
            debug!(channel = %name, pin = bcm, "output configured");
            pins.insert(name, pin);
        }
        Ok(Self { pins, clock })
    }

    fn pin(&mut self, channel: &str) -> Result<&mut OutputPin> {
        self.pins
            .get_mut(channel)
            .ok_or_else(|| HwError::UnknownChannel(channel.to_string()))
    }
}

impl<C: Clock> OutputDriver for GpioDriver<C> {
    fn pulse(&mut self, channel: &str, duration: Duration) -> DriverResult {
        self.pin(channel)?.set_high();
        trace!(channel, ms = duration.as_millis() as u64, "asserted");
        self.clock.sleep(duration);
        self.pin(channel)?.set_low();
        trace!(channel, "released");
        Ok(())
    }

    fn set(&mut self, channel: &str, asserted: bool) -> DriverResult {
        let pin = self.pin(channel)?;
        if asserted {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(())
    }

    fn release_all(&mut self) -> DriverResult {
        for pin in self.pins.values_mut() {
            pin.set_low();
        }
        Ok(())
    }
}

impl<C: Clock> Drop for GpioDriver<C> {
    fn drop(&mut self) {
        for (name, pin) in &mut self.pins {
            if pin.is_set_high() {
                warn!(channel = %name, "output still asserted at shutdown; releasing");
            }
            pin.set_low();
        }
    }
}

//! Preset and directional actuators: the only code that calls the driver.

use std::time::Duration;

use lift_traits::OutputDriver;
use tracing::debug;

use crate::anchor::Anchor;
use crate::channel::{Channel, ChannelMap};
use crate::command::ActuationCommand;
use crate::error::Result;
use crate::estimate::DirectionalPulse;

/// Look the channel up, then pulse it. Nothing is asserted when the channel
/// is unmapped.
fn pulse_channel<D: OutputDriver + ?Sized>(
    driver: &mut D,
    channels: &ChannelMap,
    channel: Channel,
    duration: Duration,
) -> Result<()> {
    let pin = channels.require(channel)?;
    debug!(
        channel = channel.name(),
        pin,
        ms = duration.as_millis() as u64,
        "pulse"
    );
    driver.pulse(channel.name(), duration)?;
    Ok(())
}

/// Presses a memory button for a fixed time.
#[derive(Debug, Clone, Copy)]
pub struct PresetActuator {
    press: Duration,
}

impl PresetActuator {
    pub fn new(press: Duration) -> Self {
        Self { press }
    }

    pub fn press(&self) -> Duration {
        self.press
    }

    pub fn command(&self, anchor: Anchor) -> ActuationCommand {
        ActuationCommand::PresetPulse {
            mode: anchor.mode,
            duration: self.press,
        }
    }

    pub fn fire<D: OutputDriver + ?Sized>(
        &self,
        driver: &mut D,
        channels: &ChannelMap,
        anchor: Anchor,
    ) -> Result<()> {
        pulse_channel(driver, channels, Channel::Preset(anchor.mode), self.press)
    }
}

/// Holds `up` or `down` for an estimated time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalActuator;

impl DirectionalActuator {
    /// Returns whether a pulse was issued; `None` and zero-length pulses
    /// touch nothing.
    pub fn fire<D: OutputDriver + ?Sized>(
        &self,
        driver: &mut D,
        channels: &ChannelMap,
        pulse: Option<DirectionalPulse>,
    ) -> Result<bool> {
        match pulse {
            Some(p) if !p.duration.is_zero() => {
                pulse_channel(driver, channels, p.direction.channel(), p.duration)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

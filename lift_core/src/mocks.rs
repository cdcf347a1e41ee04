//! Test and helper mocks for lift_core

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lift_traits::{DriverResult, OutputDriver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Pulse { channel: String, duration: Duration },
    Set { channel: String, asserted: bool },
    ReleaseAll,
}

/// Driver that records calls instead of moving anything. Clones share one
/// log, so a test can keep a handle after moving the driver into a
/// controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    log: Arc<Mutex<Vec<DriverEvent>>>,
    unavailable: Option<String>,
    fail_channel: Option<String>,
    hold: Duration,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a "hardware unavailable" error.
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    /// Pulses on `channel` fail; everything else succeeds.
    pub fn fail_on(mut self, channel: impl Into<String>) -> Self {
        self.fail_channel = Some(channel.into());
        self
    }

    /// Really sleep for `hold` on each pulse, to widen race windows in
    /// concurrency tests.
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn events(&self) -> Vec<DriverEvent> {
        self.log.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Recorded pulses as `(channel, duration)`.
    pub fn pulses(&self) -> Vec<(String, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DriverEvent::Pulse { channel, duration } => Some((channel, duration)),
                _ => None,
            })
            .collect()
    }

    fn check(&self, channel: Option<&str>) -> DriverResult {
        if let Some(reason) = &self.unavailable {
            return Err(std::io::Error::other(format!("hardware unavailable: {reason}")).into());
        }
        if channel.is_some() && channel == self.fail_channel.as_deref() {
            return Err(std::io::Error::other("output stuck").into());
        }
        Ok(())
    }

    fn record(&self, event: DriverEvent) {
        if let Ok(mut log) = self.log.lock() {
            log.push(event);
        }
    }
}

impl OutputDriver for RecordingDriver {
    fn pulse(&mut self, channel: &str, duration: Duration) -> DriverResult {
        self.check(Some(channel))?;
        if !self.hold.is_zero() {
            std::thread::sleep(self.hold);
        }
        self.record(DriverEvent::Pulse {
            channel: channel.to_string(),
            duration,
        });
        Ok(())
    }

    fn set(&mut self, channel: &str, asserted: bool) -> DriverResult {
        self.check(Some(channel))?;
        self.record(DriverEvent::Set {
            channel: channel.to_string(),
            asserted,
        });
        Ok(())
    }

    fn release_all(&mut self) -> DriverResult {
        self.check(None)?;
        self.record(DriverEvent::ReleaseAll);
        Ok(())
    }
}

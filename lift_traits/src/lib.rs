//! Hardware-facing seams shared by the lift crates.
//!
//! The core only ever talks to an [`OutputDriver`]; concrete GPIO and
//! simulated drivers live in `lift_hardware`.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Boxed error returned across the driver boundary.
pub type DriverResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Named digital outputs (`preset1`..`preset4`, `up`, `down`).
///
/// Implementations are not required to interlock channels; callers must
/// serialize access per physical rig.
pub trait OutputDriver {
    /// Assert `channel`, hold it for `duration`, then de-assert it.
    /// Blocks the caller for the whole pulse.
    fn pulse(&mut self, channel: &str, duration: Duration) -> DriverResult;

    /// Assert or de-assert `channel` until told otherwise.
    fn set(&mut self, channel: &str, asserted: bool) -> DriverResult;

    /// De-assert every channel the driver knows about.
    fn release_all(&mut self) -> DriverResult;
}

impl<T: OutputDriver + ?Sized> OutputDriver for Box<T> {
    fn pulse(&mut self, channel: &str, duration: Duration) -> DriverResult {
        (**self).pulse(channel, duration)
    }

    fn set(&mut self, channel: &str, asserted: bool) -> DriverResult {
        (**self).set(channel, asserted)
    }

    fn release_all(&mut self) -> DriverResult {
        (**self).release_all()
    }
}

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Time source for pulse holds and gaps.
///
/// Drivers hold an output asserted by calling `sleep`, so swapping the clock
/// is enough to make multi-second pulses free in tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Time elapsed since `epoch`, zero if `epoch` lies in the future.
    fn since(&self, epoch: Instant) -> Duration {
        self.now().saturating_duration_since(epoch)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}

/// Wall clock backed by `std::time::Instant` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::Mutex;

    /// Manually driven clock; `sleep(d)` advances time by `d` and returns at once.
    ///
    /// Clones share the same timeline, so a test can keep one handle while a
    /// driver owns another.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Total simulated time since construction.
        pub fn elapsed(&self) -> Duration {
            self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }
}

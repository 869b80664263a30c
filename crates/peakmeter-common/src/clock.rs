//! Clock capability
//!
//! The meter never reads time on its own; it asks a [`Clock`]. Monotonic
//! non-decreasing readings are assumed but not enforced: a reading that goes
//! backwards is treated as a stale sample and discarded by the rate window.

use crate::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of `(seconds, microseconds)` readings
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `chrono::Utc::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch wall clocks collapse to zero; every later sample is then fresh.
        Timestamp::try_from(chrono::Utc::now()).unwrap_or_default()
    }
}

/// Manually driven clock
///
/// Clones share the same underlying instant, so a test can hand one clone to
/// a meter and keep another to move time forward.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            micros: Arc::new(AtomicU64::new(start.as_micros())),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        self.micros.store(ts.as_micros(), Ordering::Release);
    }

    pub fn advance(&self, by: Duration) {
        let delta = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.advance_micros(delta);
    }

    pub fn advance_micros(&self, delta: u64) {
        // fetch_update never fails with a closure that always returns Some
        let _ = self
            .micros
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |m| Some(m.saturating_add(delta)));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::Acquire))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now().secs() > 1_577_836_800);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(Timestamp::new(10, 0));
        let handle = clock.clone();

        handle.advance(Duration::from_millis(1_500));
        assert_eq!(clock.now(), Timestamp::new(11, 500_000));

        handle.set(Timestamp::from_secs(3));
        assert_eq!(clock.now(), Timestamp::from_secs(3));
    }
}

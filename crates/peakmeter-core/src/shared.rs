//! Thread-shareable meter
//!
//! Writers (feeds, accurate reads, peak queries) serialize on a mutex around
//! the [`Meter`]. After every write the committed `(rate, timestamp)` pair is
//! republished under a separate read lock, so non-accurate rate reads never
//! contend with the feeding thread's window rotation and never observe a
//! half-written pair.

use crate::config::MeterConfig;
use crate::meter::{Meter, MeterStats};
use parking_lot::{Mutex, RwLock};
use peakmeter_common::{Clock, Horizon, Peak, SystemClock, Timestamp, HORIZON_COUNT, MICROS_PER_SEC};
use serde::{Deserialize, Serialize};

/// Last committed rate and the sample instant it was computed at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub rate: u64,
    pub at: Timestamp,
}

impl RateSnapshot {
    /// Rate as seen at `now`: zero once the snapshot is a second old
    pub fn rate_at(&self, now: Timestamp) -> u64 {
        match now.micros_since(self.at) {
            Some(elapsed) if elapsed >= MICROS_PER_SEC => 0,
            _ => self.rate,
        }
    }
}

/// Meter shared between one feeding thread and any number of readers
///
/// Typically held in an `Arc`.
#[derive(Debug)]
pub struct SharedMeter<C: Clock + Clone = SystemClock> {
    clock: C,
    meter: Mutex<Meter<C>>,
    published: RwLock<RateSnapshot>,
}

impl SharedMeter<SystemClock> {
    pub fn new(config: &MeterConfig) -> Self {
        Self::with_clock(SystemClock, config)
    }
}

impl<C: Clock + Clone> SharedMeter<C> {
    pub fn with_clock(clock: C, config: &MeterConfig) -> Self {
        Self {
            meter: Mutex::new(Meter::with_clock(clock.clone(), config)),
            clock,
            published: RwLock::new(RateSnapshot::default()),
        }
    }

    /// Feed stamped with the clock, read while holding the writer lock so a
    /// concurrent accurate read cannot commit a later instant first.
    pub fn feed(&self, increment: u64) -> u64 {
        let mut meter = self.meter.lock();
        let rate = meter.feed(increment);
        self.publish(&meter);
        rate
    }

    pub fn feed_at(&self, increment: u64, ts: Timestamp) -> u64 {
        let mut meter = self.meter.lock();
        let rate = meter.feed_at(increment, ts);
        self.publish(&meter);
        rate
    }

    /// Current rate; `accurate` takes the writer lock and rotates the window
    pub fn read_rate(&self, accurate: bool) -> u64 {
        if accurate {
            self.feed(0)
        } else {
            self.snapshot().rate_at(self.clock.now())
        }
    }

    /// Last published rate snapshot
    pub fn snapshot(&self) -> RateSnapshot {
        *self.published.read()
    }

    pub fn peak(&self, horizon: Horizon) -> Peak {
        self.meter.lock().peak(horizon)
    }

    pub fn peak_at(&self, index: usize) -> Option<Peak> {
        self.meter.lock().peak_at(index)
    }

    pub fn all_peaks(&self) -> [Peak; HORIZON_COUNT] {
        self.meter.lock().all_peaks()
    }

    pub fn period(&self, horizon: Horizon) -> u32 {
        self.meter.lock().period(horizon)
    }

    pub fn period_at(&self, index: usize) -> u32 {
        self.meter.lock().period_at(index)
    }

    pub fn set_period(&self, horizon: Horizon, secs: u32) {
        self.meter.lock().set_period(horizon, secs);
    }

    pub fn all_periods(&self) -> [u32; HORIZON_COUNT] {
        self.meter.lock().all_periods()
    }

    pub fn set_all_periods(&self, periods: Option<[u32; HORIZON_COUNT]>) {
        self.meter.lock().set_all_periods(periods);
    }

    pub fn saturated(&self) -> bool {
        self.meter.lock().saturated()
    }

    pub fn stats(&self) -> MeterStats {
        self.meter.lock().stats()
    }

    pub fn reset(&self) {
        let mut meter = self.meter.lock();
        meter.reset();
        self.publish(&meter);
    }

    /// Run a closure with exclusive access to the inner meter
    pub fn with_meter<R>(&self, f: impl FnOnce(&mut Meter<C>) -> R) -> R {
        let mut meter = self.meter.lock();
        let out = f(&mut meter);
        self.publish(&meter);
        out
    }

    fn publish(&self, meter: &Meter<C>) {
        let next = RateSnapshot {
            rate: meter.rate_total(),
            at: meter.last_timestamp(),
        };
        *self.published.write() = next;
    }
}

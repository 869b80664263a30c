//! Meter - rate window and peak tracker composed behind one clock
//!
//! Data flows one way: `feed` updates the rate window, and the resulting rate
//! is pushed into the peak tracker. Rejected (out-of-order) samples never
//! reach the tracker.

use crate::config::MeterConfig;
use crate::peak::PeakTracker;
use crate::rate::RateMeter;
use peakmeter_common::{Clock, Horizon, Peak, SystemClock, Timestamp, HORIZON_COUNT};
use serde::{Deserialize, Serialize};

/// Sample counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterStats {
    /// Samples applied to the window
    pub accepted: u64,
    /// Out-of-order samples discarded
    pub rejected: u64,
}

/// Timer-free rate meter with multi-horizon peaks
///
/// Single writer: every `&mut self` method mutates shared window state. Wrap
/// in [`SharedMeter`](crate::SharedMeter) to read from other threads.
#[derive(Debug, Clone)]
pub struct Meter<C: Clock = SystemClock> {
    clock: C,
    rate: RateMeter,
    peaks: PeakTracker,
    stats: MeterStats,
}

impl Meter<SystemClock> {
    /// Create a meter on the wall clock
    pub fn new(config: &MeterConfig) -> Self {
        Self::with_clock(SystemClock, config)
    }
}

impl Default for Meter<SystemClock> {
    fn default() -> Self {
        Self::new(&MeterConfig::default())
    }
}

impl<C: Clock> Meter<C> {
    pub fn with_clock(clock: C, config: &MeterConfig) -> Self {
        Self {
            clock,
            rate: RateMeter::new(),
            peaks: PeakTracker::new(Some(config.period_array())),
            stats: MeterStats::default(),
        }
    }

    /// Feed an increment stamped with the current clock reading
    pub fn feed(&mut self, increment: u64) -> u64 {
        let now = self.clock.now();
        self.feed_at(increment, now)
    }

    /// Feed an increment with a caller-supplied timestamp
    ///
    /// Returns the rolling one-second rate. A timestamp older than the last
    /// accepted one is ignored and the previous rate is returned.
    pub fn feed_at(&mut self, increment: u64, ts: Timestamp) -> u64 {
        match self.rate.try_feed(increment, ts) {
            Some(rate) => {
                self.stats.accepted += 1;
                self.peaks.update(rate, ts);
                rate
            }
            None => {
                self.stats.rejected += 1;
                self.rate.total()
            }
        }
    }

    /// Current rate
    ///
    /// `accurate` forces the window up to now (a zero feed, which also
    /// refreshes peaks). Otherwise the last committed rate is returned, or
    /// zero if the last sample is more than a second old.
    pub fn read_rate(&mut self, accurate: bool) -> u64 {
        if accurate {
            self.feed(0)
        } else {
            self.last_rate()
        }
    }

    /// Non-mutating rate read as of the clock's current reading
    pub fn last_rate(&self) -> u64 {
        self.rate.rate_at(self.clock.now())
    }

    /// Rate committed by the last accepted feed, with no expiry applied
    pub fn rate_total(&self) -> u64 {
        self.rate.total()
    }

    pub fn peak(&mut self, horizon: Horizon) -> Peak {
        let now = self.clock.now();
        self.peaks.peak(horizon, now)
    }

    /// Peak by horizon index; `None` when out of range
    pub fn peak_at(&mut self, index: usize) -> Option<Peak> {
        Horizon::from_index(index).map(|h| self.peak(h))
    }

    pub fn all_peaks(&mut self) -> [Peak; HORIZON_COUNT] {
        let now = self.clock.now();
        self.peaks.all_peaks(now)
    }

    pub fn period(&self, horizon: Horizon) -> u32 {
        self.peaks.period(horizon)
    }

    /// Period by horizon index; `0` when out of range
    pub fn period_at(&self, index: usize) -> u32 {
        Horizon::from_index(index).map_or(0, |h| self.period(h))
    }

    /// Set a horizon length in seconds; `0` restores its default
    pub fn set_period(&mut self, horizon: Horizon, secs: u32) {
        self.peaks.set_period(horizon, secs);
    }

    /// Set a horizon length by index; out-of-range indexes are ignored
    pub fn set_period_at(&mut self, index: usize, secs: u32) {
        if let Some(h) = Horizon::from_index(index) {
            self.set_period(h, secs);
        }
    }

    pub fn all_periods(&self) -> [u32; HORIZON_COUNT] {
        self.peaks.all_periods()
    }

    /// Set every horizon length; `None` restores all defaults
    pub fn set_all_periods(&mut self, periods: Option<[u32; HORIZON_COUNT]>) {
        self.peaks.set_all_periods(periods);
    }

    /// Whether the rate accumulator ever saturated
    pub fn saturated(&self) -> bool {
        self.rate.saturated()
    }

    pub fn stats(&self) -> MeterStats {
        self.stats
    }

    /// Timestamp of the last accepted sample
    pub fn last_timestamp(&self) -> Timestamp {
        self.rate.last_timestamp()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Clear rate, peaks and counters; periods are kept
    pub fn reset(&mut self) {
        self.rate.reset();
        self.peaks.reset();
        self.stats = MeterStats::default();
    }
}

//! Cascading multi-horizon peak tracker
//!
//! Each horizon keeps the highest rate seen in its current epoch, where an
//! epoch is `floor(secs / period)`. Expiry is evaluated lazily: every update
//! checks whether the short epoch rolled, and only then looks at the coarser
//! horizons. Queries feed a zero rate through the same path, so an idle
//! horizon ages out without any timer.

use peakmeter_common::{Horizon, Peak, Timestamp, DEFAULT_PERIODS, HORIZON_COUNT};
use tracing::debug;

/// Per-horizon running maxima
#[derive(Debug, Clone)]
pub struct PeakTracker {
    /// Horizon lengths in seconds, never zero
    periods: [u32; HORIZON_COUNT],
    /// Current peak per horizon
    peaks: [Peak; HORIZON_COUNT],
}

impl Default for PeakTracker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PeakTracker {
    /// Create a tracker; `None` or zero entries fall back to the defaults
    pub fn new(periods: Option<[u32; HORIZON_COUNT]>) -> Self {
        let mut tracker = Self {
            periods: DEFAULT_PERIODS,
            peaks: [Peak::default(); HORIZON_COUNT],
        };
        tracker.set_all_periods(periods);
        tracker
    }

    /// Push the current rate observed at `ts`
    pub fn update(&mut self, rate: u64, ts: Timestamp) {
        if self.epoch_rolled(0, ts) {
            self.peaks[0].value = 0;

            // Coarser horizons are only checked once the finer one rolled,
            // and restart from the live rate rather than from zero.
            for h in 1..HORIZON_COUNT {
                if !self.epoch_rolled(h, ts) {
                    break;
                }
                debug!(
                    horizon = %Horizon::ALL[h],
                    previous = self.peaks[h].value,
                    seed = rate,
                    "Peak epoch rolled over"
                );
                self.peaks[h] = Peak::new(rate, ts);
            }
        }

        for h in 0..HORIZON_COUNT {
            if rate <= self.peaks[h].value {
                break;
            }
            self.peaks[h] = Peak::new(rate, ts);
        }
    }

    /// Peak for a horizon after lazily expiring epochs up to `now`
    pub fn peak(&mut self, horizon: Horizon, now: Timestamp) -> Peak {
        self.update(0, now);
        self.peaks[horizon.index()]
    }

    /// All peaks after lazily expiring epochs up to `now`
    pub fn all_peaks(&mut self, now: Timestamp) -> [Peak; HORIZON_COUNT] {
        self.update(0, now);
        self.peaks
    }

    /// Stored peaks without evaluating expiry
    pub fn snapshot(&self) -> [Peak; HORIZON_COUNT] {
        self.peaks
    }

    pub fn period(&self, horizon: Horizon) -> u32 {
        self.periods[horizon.index()]
    }

    pub fn all_periods(&self) -> [u32; HORIZON_COUNT] {
        self.periods
    }

    /// Set one horizon's length; zero selects its default
    ///
    /// Existing peaks are kept as they are.
    pub fn set_period(&mut self, horizon: Horizon, secs: u32) {
        self.periods[horizon.index()] = if secs > 0 {
            secs
        } else {
            horizon.default_period()
        };
    }

    /// Set every horizon's length; `None` restores all defaults
    pub fn set_all_periods(&mut self, periods: Option<[u32; HORIZON_COUNT]>) {
        let periods = periods.unwrap_or(DEFAULT_PERIODS);
        for horizon in Horizon::ALL {
            self.set_period(horizon, periods[horizon.index()]);
        }
    }

    /// Clear all peaks, keeping the configured periods
    pub fn reset(&mut self) {
        self.peaks = [Peak::default(); HORIZON_COUNT];
    }

    fn epoch_rolled(&self, h: usize, ts: Timestamp) -> bool {
        let period = u64::from(self.periods[h]);
        ts.secs() / period > self.peaks[h].timestamp.secs() / period
    }
}

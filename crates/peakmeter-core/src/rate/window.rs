//! Sliding one-second rate window
//!
//! A fixed ring of sub-second slots plus a running total. Each sample lands
//! in the slot for its sub-second offset; before it lands, every slot between
//! the previous sample's slot and the new one is expired, since its contents
//! are now a full second old. No timer is involved: the window only moves
//! when it is fed.

use peakmeter_common::{Timestamp, DEFAULT_SLOTS, MICROS_PER_SEC};
use tracing::{debug, trace, warn};

/// Circular-buffer rolling-second rate estimator
#[derive(Debug, Clone)]
pub struct RateMeter<const SLOTS: usize = { DEFAULT_SLOTS }> {
    /// Last accepted sample instant
    last_timestamp: Timestamp,
    /// Per-slot sums for the current rolling second
    buckets: [u64; SLOTS],
    /// Sum of all buckets, i.e. the current rate
    total: u64,
    /// Latched once any accumulation hit `u64::MAX`
    saturated: bool,
}

impl<const SLOTS: usize> Default for RateMeter<SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SLOTS: usize> RateMeter<SLOTS> {
    /// Create an empty window whose last sample is the Unix epoch
    pub fn new() -> Self {
        assert!(SLOTS > 0, "rate window needs at least one slot");
        Self {
            last_timestamp: Timestamp::ZERO,
            buckets: [0; SLOTS],
            total: 0,
            saturated: false,
        }
    }

    /// Slot index for a timestamp's sub-second offset, always in `0..SLOTS`
    #[inline]
    pub fn slot_of(ts: Timestamp) -> usize {
        (u64::from(ts.micros()) * SLOTS as u64 / MICROS_PER_SEC) as usize
    }

    /// Feed an increment, returning the rolling one-second rate
    ///
    /// A sample older than the last accepted one leaves the window untouched
    /// and the previously computed rate is returned.
    pub fn feed(&mut self, increment: u64, ts: Timestamp) -> u64 {
        self.try_feed(increment, ts).unwrap_or(self.total)
    }

    /// Feed an increment, or `None` if the sample is stale
    pub fn try_feed(&mut self, increment: u64, ts: Timestamp) -> Option<u64> {
        if ts < self.last_timestamp {
            trace!(
                sample = %ts,
                last = %self.last_timestamp,
                "Rejected out-of-order sample"
            );
            return None;
        }

        let cur_slot = Self::slot_of(ts);
        if self.window_expired(ts) {
            if self.total > 0 {
                debug!(expired = self.total, "Rate window fully expired");
            }
            self.buckets = [0; SLOTS];
            self.total = 0;
        } else {
            self.rotate_to(cur_slot, ts.secs() > self.last_timestamp.secs());
        }

        self.accumulate(cur_slot, increment);
        self.last_timestamp = ts;
        Some(self.total)
    }

    /// Read-only rate as of `now`
    ///
    /// Returns zero when more than a second has passed since the last sample,
    /// without touching the stale buckets.
    pub fn rate_at(&self, now: Timestamp) -> u64 {
        if now < self.last_timestamp {
            return self.total;
        }
        if self.window_expired(now) {
            0
        } else {
            self.total
        }
    }

    /// Rate computed by the last accepted feed
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn last_timestamp(&self) -> Timestamp {
        self.last_timestamp
    }

    /// Per-slot sums, indexed by slot
    pub fn buckets(&self) -> &[u64; SLOTS] {
        &self.buckets
    }

    /// Whether any accumulation saturated since the last reset
    #[inline]
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Forget everything, including the overflow flag
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// True when `ts` is a full second or more past the last sample
    fn window_expired(&self, ts: Timestamp) -> bool {
        let sec_diff = ts.secs().saturating_sub(self.last_timestamp.secs());
        if sec_diff > 1 {
            return true;
        }
        let us_diff = (sec_diff * MICROS_PER_SEC + u64::from(ts.micros()))
            .saturating_sub(u64::from(self.last_timestamp.micros()));
        us_diff >= MICROS_PER_SEC
    }

    /// Expire every slot after the last sample's slot up to and including
    /// `cur_slot`, wrapping around the ring.
    ///
    /// With equal slots the walk is empty inside one second and a full lap
    /// across a second boundary.
    fn rotate_to(&mut self, cur_slot: usize, crossed_second: bool) {
        let last_slot = Self::slot_of(self.last_timestamp);
        if cur_slot == last_slot && !crossed_second {
            return;
        }

        // Equal slots one second apart: the slot's contents are a second old,
        // so the lap clears it too instead of expiring nothing.
        let mut removed = 0u64;
        let mut slot = last_slot;
        loop {
            slot = (slot + 1) % SLOTS;
            removed = removed.saturating_add(self.buckets[slot]);
            self.buckets[slot] = 0;
            if slot == cur_slot {
                break;
            }
        }
        self.total = self.total.saturating_sub(removed);
    }

    fn accumulate(&mut self, slot: usize, increment: u64) {
        let (bucket, bucket_overflow) = self.buckets[slot].overflowing_add(increment);
        let (total, total_overflow) = self.total.overflowing_add(increment);

        if bucket_overflow || total_overflow {
            if !self.saturated {
                warn!(slot, increment, "Rate accumulator saturated at u64::MAX");
            }
            self.saturated = true;
        }

        self.buckets[slot] = if bucket_overflow { u64::MAX } else { bucket };
        self.total = if total_overflow { u64::MAX } else { total };
    }
}

//! Timestamp - second + microsecond instant fed to the meter
//!
//! Ordering is by seconds first, then microseconds, which is exactly the
//! staleness test the rate window applies to incoming samples.

use crate::{MeterError, Result, MICROS_PER_SEC};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Instant with microsecond resolution, measured from the Unix epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawTimestamp")]
pub struct Timestamp {
    secs: u64,
    micros: u32,
}

impl Timestamp {
    /// The Unix epoch, also the initial "last seen" instant of a fresh meter
    pub const ZERO: Timestamp = Timestamp { secs: 0, micros: 0 };

    /// Create a timestamp, carrying excess microseconds into seconds
    pub fn new(secs: u64, micros: u32) -> Self {
        let carry = u64::from(micros) / MICROS_PER_SEC;
        Self {
            secs: secs.saturating_add(carry),
            micros: (u64::from(micros) % MICROS_PER_SEC) as u32,
        }
    }

    /// Whole seconds only
    pub fn from_secs(secs: u64) -> Self {
        Self { secs, micros: 0 }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::from_micros(millis.saturating_mul(1_000))
    }

    pub fn from_micros(micros: u64) -> Self {
        Self {
            secs: micros / MICROS_PER_SEC,
            micros: (micros % MICROS_PER_SEC) as u32,
        }
    }

    #[inline]
    pub fn secs(&self) -> u64 {
        self.secs
    }

    /// Sub-second part, always in `0..1_000_000`
    #[inline]
    pub fn micros(&self) -> u32 {
        self.micros
    }

    /// Total microseconds since the epoch (saturating)
    pub fn as_micros(&self) -> u64 {
        self.secs
            .saturating_mul(MICROS_PER_SEC)
            .saturating_add(u64::from(self.micros))
    }

    /// Microseconds from `earlier` to `self`, or `None` if `earlier` is later
    pub fn micros_since(&self, earlier: Timestamp) -> Option<u64> {
        if *self < earlier {
            return None;
        }
        let secs = self.secs - earlier.secs;
        Some(
            secs.saturating_mul(MICROS_PER_SEC)
                .saturating_add(u64::from(self.micros))
                .saturating_sub(u64::from(earlier.micros)),
        )
    }

    /// Shift forward by a number of microseconds
    pub fn add_micros(&self, micros: u64) -> Self {
        Self::from_micros(self.as_micros().saturating_add(micros))
    }

    /// Convert to a UTC date-time, if representable
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.secs).ok()?;
        DateTime::<Utc>::from_timestamp(secs, self.micros * 1_000)
    }
}

/// Wire form; deserialization goes through [`Timestamp::new`] so `micros`
/// always ends up below one second.
#[derive(Deserialize)]
struct RawTimestamp {
    secs: u64,
    micros: u32,
}

impl From<RawTimestamp> for Timestamp {
    fn from(raw: RawTimestamp) -> Self {
        Self::new(raw.secs, raw.micros)
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = MeterError;

    fn try_from(dt: DateTime<Utc>) -> Result<Self> {
        let secs = u64::try_from(dt.timestamp())
            .map_err(|_| MeterError::Clock(format!("instant before Unix epoch: {}", dt)))?;
        Ok(Self::new(secs, dt.timestamp_subsec_micros()))
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = MeterError;

    fn try_from(time: SystemTime) -> Result<Self> {
        let since = time
            .duration_since(UNIX_EPOCH)
            .map_err(|e| MeterError::Clock(e.to_string()))?;
        Ok(Self::new(since.as_secs(), since.subsec_micros()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}+{:06}", dt.format("%Y-%m-%dT%H:%M:%S"), self.micros),
            None => write!(f, "{}.{:06}", self.secs, self.micros),
        }
    }
}

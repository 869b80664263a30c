//! # Peakmeter Common
//!
//! Shared types, errors, and the clock capability for the Peakmeter rate meter.
//!
//! ## Core Types
//!
//! - [`Timestamp`]: second + microsecond instant, ordered lexicographically
//! - [`Horizon`]: one of the nested peak horizons (short/medium/long)
//! - [`Peak`]: highest rate seen in a horizon and when it was observed
//!
//! ## Clock
//!
//! - [`SystemClock`]: wall clock backed by `chrono`
//! - [`ManualClock`]: settable clock for tests, benches and replay

pub mod clock;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{MeterError, Result};
pub use types::{
    horizon::{Horizon, HORIZON_COUNT},
    peak::Peak,
    timestamp::Timestamp,
};

/// Peakmeter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Microseconds in one second
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Default number of sub-second slots in the rate window
pub const DEFAULT_SLOTS: usize = 10;

/// Default short horizon: one hour
pub const DEFAULT_SHORT_PERIOD: u32 = 60 * 60;

/// Default medium horizon: one day
pub const DEFAULT_MEDIUM_PERIOD: u32 = 24 * 60 * 60;

/// Default long horizon: thirty days
pub const DEFAULT_LONG_PERIOD: u32 = 30 * 24 * 60 * 60;

/// Default periods indexed by horizon
pub const DEFAULT_PERIODS: [u32; HORIZON_COUNT] = [
    DEFAULT_SHORT_PERIOD,
    DEFAULT_MEDIUM_PERIOD,
    DEFAULT_LONG_PERIOD,
];

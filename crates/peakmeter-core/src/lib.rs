//! # Peakmeter
//!
//! Timer-free rate metering for hot paths.
//!
//! ## Components
//!
//! - [`RateMeter`]: rolling one-second rate over a fixed ring of sub-second slots
//! - [`PeakTracker`]: highest rate per nested horizon, expired lazily on access
//! - [`Meter`]: both of the above driven by one [`Clock`](peakmeter_common::Clock)
//! - [`SharedMeter`]: single-writer / many-reader wrapper for use across threads
//!
//! ## Usage
//!
//! ```
//! use peakmeter_core::{Meter, MeterConfig};
//! use peakmeter_common::{Horizon, ManualClock, Timestamp};
//!
//! let clock = ManualClock::new(Timestamp::from_secs(1_000));
//! let mut meter = Meter::with_clock(clock.clone(), &MeterConfig::nested(2));
//!
//! meter.feed(5);
//! assert_eq!(meter.read_rate(true), 5);
//! assert_eq!(meter.peak(Horizon::Short).value, 5);
//! ```
//!
//! No allocation or background work happens after construction; every
//! operation is O(slots) at worst.

pub mod config;
pub mod meter;
pub mod peak;
pub mod rate;
pub mod shared;

pub use config::{MeterConfig, PeriodSettings};
pub use meter::{Meter, MeterStats};
pub use peak::PeakTracker;
pub use rate::RateMeter;
pub use shared::{RateSnapshot, SharedMeter};

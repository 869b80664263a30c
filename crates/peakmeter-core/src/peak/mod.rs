//! Peak module
//!
//! Provides lazily-expiring multi-horizon peak tracking:
//! - PeakTracker: per-horizon maximum with cascading propagation

pub mod tracker;

pub use tracker::PeakTracker;

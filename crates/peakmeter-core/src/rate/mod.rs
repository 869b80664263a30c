//! Rate module
//!
//! Provides the rolling one-second rate estimator:
//! - RateMeter: fixed ring of sub-second slots with a running total

pub mod window;

pub use window::RateMeter;

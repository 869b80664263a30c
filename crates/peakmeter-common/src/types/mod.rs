//! Core metering types

pub mod horizon;
pub mod peak;
pub mod timestamp;

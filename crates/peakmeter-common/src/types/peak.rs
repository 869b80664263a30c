//! Peak - highest rate observed within a horizon epoch

use super::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Peak rate and the instant it was first reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peak {
    /// Rate value (units per second)
    pub value: u64,
    /// When the value was first observed
    pub timestamp: Timestamp,
}

impl Peak {
    pub fn new(value: u64, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }
}

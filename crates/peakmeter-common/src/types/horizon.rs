//! Horizon - nested historical windows over which peaks are tracked
//!
//! Horizons are ordered from finest to coarsest. The peak tracker checks the
//! short horizon's epoch first and only descends to coarser horizons when the
//! finer one rolls over.

use crate::{MeterError, Result, DEFAULT_PERIODS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tracked horizons
pub const HORIZON_COUNT: usize = 3;

/// Peak horizon selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Default one hour
    Short = 0,
    /// Default one day
    Medium = 1,
    /// Default thirty days
    Long = 2,
}

impl Horizon {
    /// All horizons, finest first
    pub const ALL: [Horizon; HORIZON_COUNT] = [Horizon::Short, Horizon::Medium, Horizon::Long];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Period substituted when a horizon is configured with zero seconds
    pub fn default_period(self) -> u32 {
        DEFAULT_PERIODS[self.index()]
    }

    /// Look up a horizon by index without producing an error
    pub fn from_index(index: usize) -> Option<Horizon> {
        Self::ALL.get(index).copied()
    }
}

impl TryFrom<usize> for Horizon {
    type Error = MeterError;

    fn try_from(index: usize) -> Result<Self> {
        Self::from_index(index).ok_or(MeterError::InvalidHorizon {
            index,
            count: HORIZON_COUNT,
        })
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Short => write!(f, "short"),
            Horizon::Medium => write!(f, "medium"),
            Horizon::Long => write!(f, "long"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, h) in Horizon::ALL.iter().enumerate() {
            assert_eq!(h.index(), i);
            assert_eq!(Horizon::try_from(i).unwrap(), *h);
        }
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(Horizon::from_index(HORIZON_COUNT), None);
        let err = Horizon::try_from(9).unwrap_err();
        assert!(matches!(err, MeterError::InvalidHorizon { index: 9, count: 3 }));
    }

    #[test]
    fn test_default_periods() {
        assert_eq!(Horizon::Short.default_period(), 3_600);
        assert_eq!(Horizon::Medium.default_period(), 86_400);
        assert_eq!(Horizon::Long.default_period(), 2_592_000);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Horizon::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}

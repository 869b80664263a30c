//! Meter configuration

use peakmeter_common::{
    Horizon, Result, DEFAULT_LONG_PERIOD, DEFAULT_MEDIUM_PERIOD, DEFAULT_SHORT_PERIOD,
    HORIZON_COUNT,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Meter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterConfig {
    /// Peak horizon lengths
    #[serde(default)]
    pub periods: PeriodSettings,
}

impl MeterConfig {
    /// Load configuration from environment (and `.env` if present)
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        for horizon in Horizon::ALL {
            let key = format!("PEAKMETER_PERIOD_{}", horizon.to_string().to_uppercase());
            if let Ok(val) = std::env::var(&key) {
                match val.trim().parse::<u32>() {
                    Ok(secs) => cfg.periods.set(horizon, secs),
                    Err(e) => warn!(%key, %val, error = %e, "Ignoring unparsable period"),
                }
            }
        }

        cfg.check_nesting();
        Ok(cfg)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.check_nesting();
        Ok(cfg)
    }

    /// Geometric ladder `base`, `4 * base`, `16 * base` seconds
    pub fn nested(base: u32) -> Self {
        let medium = base.saturating_mul(4);
        Self {
            periods: PeriodSettings {
                short: base,
                medium,
                long: medium.saturating_mul(4),
            },
        }
    }

    /// Periods indexed by horizon; zeros are resolved later by the tracker
    pub fn period_array(&self) -> [u32; HORIZON_COUNT] {
        [self.periods.short, self.periods.medium, self.periods.long]
    }

    /// Non-nested horizons still work but make peaks hard to interpret
    fn check_nesting(&self) {
        let resolved = Horizon::ALL.map(|h| match self.periods.get(h) {
            0 => h.default_period(),
            p => p,
        });
        if resolved.windows(2).any(|w| w[0] > w[1]) {
            warn!(periods = ?resolved, "Peak horizons are not nested (short <= medium <= long)");
        }
    }
}

/// Horizon lengths in seconds; `0` selects the horizon's default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSettings {
    #[serde(default = "default_short")]
    pub short: u32,
    #[serde(default = "default_medium")]
    pub medium: u32,
    #[serde(default = "default_long")]
    pub long: u32,
}

impl PeriodSettings {
    pub fn get(&self, horizon: Horizon) -> u32 {
        match horizon {
            Horizon::Short => self.short,
            Horizon::Medium => self.medium,
            Horizon::Long => self.long,
        }
    }

    pub fn set(&mut self, horizon: Horizon, secs: u32) {
        match horizon {
            Horizon::Short => self.short = secs,
            Horizon::Medium => self.medium = secs,
            Horizon::Long => self.long = secs,
        }
    }
}

impl Default for PeriodSettings {
    fn default() -> Self {
        Self {
            short: DEFAULT_SHORT_PERIOD,
            medium: DEFAULT_MEDIUM_PERIOD,
            long: DEFAULT_LONG_PERIOD,
        }
    }
}

fn default_short() -> u32 {
    DEFAULT_SHORT_PERIOD
}

fn default_medium() -> u32 {
    DEFAULT_MEDIUM_PERIOD
}

fn default_long() -> u32 {
    DEFAULT_LONG_PERIOD
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_periods() {
        let cfg = MeterConfig::default();
        assert_eq!(cfg.period_array(), [3_600, 86_400, 2_592_000]);
    }

    #[test]
    fn test_nested_ladder() {
        let cfg = MeterConfig::nested(2);
        assert_eq!(cfg.period_array(), [2, 8, 32]);
        assert_eq!(cfg.periods.get(Horizon::Medium), 8);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: MeterConfig = serde_json::from_str(r#"{"periods":{"short":60}}"#).unwrap();
        assert_eq!(cfg.period_array(), [60, 86_400, 2_592_000]);

        let empty: MeterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, MeterConfig::default());
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("peakmeter-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"periods":{{"short":5,"medium":20,"long":80}}}}"#).unwrap();

        let cfg = MeterConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.period_array(), [5, 20, 80]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MeterConfig::from_json_file("/nonexistent/peakmeter.json").unwrap_err();
        assert!(matches!(err, peakmeter_common::MeterError::Io(_)));
    }
}

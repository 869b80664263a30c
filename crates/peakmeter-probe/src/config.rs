//! Probe configuration

use anyhow::{bail, Context, Result};
use peakmeter_core::MeterConfig;

/// Usage banner printed when no period is given
pub const USAGE: &str = "\
peakmeter-probe <period>         : start feeding with peak periods period/4x/16x
peakmeter-probe <period> print   : also report from a separate reader task
Type a speed (events/sec) and press enter while running; a negative value stops.";

/// Probe settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Short horizon length; medium and long are 4x and 16x
    pub base_period: u32,
    /// Initial feed speed (events per second)
    pub speed: u32,
    /// Interval between report lines
    pub report_interval_ms: u64,
    /// Report from a separate reader task using non-accurate reads
    pub reader_task: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_period: 2,
            speed: 100,
            report_interval_ms: 200,
            reader_task: false,
        }
    }
}

impl ProbeConfig {
    /// Load from `.env`/environment, then positional arguments
    ///
    /// Returns `None` when no period argument was given.
    pub fn load<I>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = String>,
    {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        if let Ok(val) = std::env::var("PEAKMETER_PROBE_SPEED") {
            if let Ok(v) = val.parse() {
                cfg.speed = v;
            }
        }
        if let Ok(val) = std::env::var("PEAKMETER_PROBE_REPORT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                cfg.report_interval_ms = v.max(1);
            }
        }

        cfg.apply_args(args)
    }

    fn apply_args<I>(mut self, args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(period) = args.next() else {
            return Ok(None);
        };
        self.base_period = period
            .parse()
            .with_context(|| format!("invalid period: {}", period))?;
        if self.base_period == 0 {
            bail!("period must be positive");
        }
        self.reader_task = args.next().is_some();
        Ok(Some(self))
    }

    pub fn meter_config(&self) -> MeterConfig {
        MeterConfig::nested(self.base_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_means_usage() {
        let cfg = ProbeConfig::default().apply_args(args(&[])).unwrap();
        assert!(cfg.is_none());
    }

    #[test]
    fn test_period_and_print_flag() {
        let cfg = ProbeConfig::default()
            .apply_args(args(&["3", "1"]))
            .unwrap()
            .unwrap();
        assert_eq!(cfg.base_period, 3);
        assert!(cfg.reader_task);
        assert_eq!(cfg.meter_config().period_array(), [3, 12, 48]);
    }

    #[test]
    fn test_invalid_period() {
        assert!(ProbeConfig::default().apply_args(args(&["abc"])).is_err());
        assert!(ProbeConfig::default().apply_args(args(&["0"])).is_err());
    }
}

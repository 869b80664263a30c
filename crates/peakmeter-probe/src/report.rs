//! Report line formatting

use peakmeter_common::{Peak, HORIZON_COUNT};
use std::fmt::Write;

/// One status line: configured speed, live rate, and each horizon's peak
pub fn format_report(
    cfg_speed: u32,
    real: u64,
    peaks: &[Peak; HORIZON_COUNT],
    periods: &[u32; HORIZON_COUNT],
) -> String {
    let mut line = format!("CfgSpeed:{:5} RealSpeed:{:5} PeakSpeed/TS", cfg_speed, real);
    for (peak, period) in peaks.iter().zip(periods) {
        let _ = write!(line, " [{}s]{} {}", period, peak.value, peak.timestamp);
    }
    line
}

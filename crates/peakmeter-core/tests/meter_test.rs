//! End-to-end behaviour of the meter through its public API
//!
//! All scenarios run on a `ManualClock` so every timestamp is exact.

use peakmeter_common::{Horizon, ManualClock, Peak, Timestamp};
use peakmeter_core::{Meter, MeterConfig, SharedMeter};
use std::sync::Arc;
use std::time::Duration;

/// Multiple of 32 so all three horizons of a {2, 8, 32} ladder start a fresh epoch
const T0: u64 = 6_400;

fn ladder_meter() -> (Meter<ManualClock>, ManualClock) {
    let clock = ManualClock::new(Timestamp::from_secs(T0));
    let meter = Meter::with_clock(clock.clone(), &MeterConfig::nested(2));
    (meter, clock)
}

#[test]
fn test_window_conservation_under_one_second() {
    let (mut meter, clock) = ladder_meter();
    let mut fed = 0;

    for i in 0..20u64 {
        meter.feed(i + 1);
        fed += i + 1;
        clock.advance(Duration::from_millis(45));
    }

    assert_eq!(meter.read_rate(true), fed);
}

#[test]
fn test_idle_second_expires_window() {
    let (mut meter, clock) = ladder_meter();
    meter.feed(40);
    meter.feed(2);

    clock.advance(Duration::from_millis(1_001));
    assert_eq!(meter.read_rate(false), 0);
    assert_eq!(meter.read_rate(true), 0);
}

#[test]
fn test_out_of_order_sample_leaves_state() {
    let (mut meter, _clock) = ladder_meter();
    let t = Timestamp::new(T0, 400_000);

    let at_t = meter.feed_at(12, t);
    let peaks_before = meter.all_peaks();

    assert_eq!(meter.feed_at(99, Timestamp::new(T0 - 1, 400_000)), at_t);
    assert_eq!(meter.last_timestamp(), t);
    assert_eq!(meter.all_peaks(), peaks_before);
    assert_eq!(meter.stats().rejected, 1);
}

#[test]
fn test_idempotent_fast_read() {
    let (mut meter, clock) = ladder_meter();
    meter.feed(8);
    clock.advance(Duration::from_millis(300));

    let first = meter.read_rate(false);
    let second = meter.read_rate(false);
    assert_eq!(first, second);
    assert_eq!(first, 8);
}

#[test]
fn test_ladder_scenario() {
    let (mut meter, clock) = ladder_meter();
    assert_eq!(meter.all_periods(), [2, 8, 32]);

    // Five units inside the first second.
    meter.feed(5);
    clock.advance(Duration::from_millis(500));
    assert_eq!(meter.read_rate(true), 5);
    assert_eq!(
        meter.peak(Horizon::Short),
        Peak::new(5, Timestamp::from_secs(T0))
    );

    // t = T0 + 3 crosses the 2s short epoch, not the 8s medium one.
    clock.set(Timestamp::from_secs(T0 + 3));
    assert_eq!(meter.feed(1), 1);

    let peaks = meter.all_peaks();
    assert_eq!(peaks[0], Peak::new(1, Timestamp::from_secs(T0 + 3)));
    assert_eq!(peaks[1], Peak::new(5, Timestamp::from_secs(T0)));
    assert_eq!(peaks[2], Peak::new(5, Timestamp::from_secs(T0)));
}

#[test]
fn test_short_epoch_reset_long_retains() {
    let (mut meter, clock) = ladder_meter();
    for _ in 0..30 {
        meter.feed(1);
    }
    assert_eq!(meter.peak(Horizon::Long).value, 30);

    clock.set(Timestamp::from_secs(T0 + 2 + 1));
    meter.feed(1);

    assert_eq!(meter.peak(Horizon::Short).value, 1);
    assert_eq!(meter.peak(Horizon::Long).value, 30);
    assert_eq!(meter.peak(Horizon::Long).timestamp, Timestamp::from_secs(T0));
}

#[test]
fn test_medium_rollover_seeds_from_live_rate() {
    let (mut meter, clock) = ladder_meter();
    meter.feed(20);

    // Past the medium boundary with a live rate of 3.
    clock.set(Timestamp::from_secs(T0 + 9));
    meter.feed(3);

    let peaks = meter.all_peaks();
    assert_eq!(peaks.map(|p| p.value), [3, 3, 20]);
    assert_eq!(peaks[1].timestamp, Timestamp::from_secs(T0 + 9));
}

#[test]
fn test_queries_age_out_idle_meter() {
    let (mut meter, clock) = ladder_meter();
    meter.feed(7);

    clock.set(Timestamp::from_secs(T0 + 40));
    let peaks = meter.all_peaks();
    assert_eq!(peaks.map(|p| p.value), [0, 0, 0]);
    assert_eq!(peaks[2].timestamp, Timestamp::from_secs(T0 + 40));
}

#[test]
fn test_reconfigure_does_not_rescale_peaks() {
    let (mut meter, _clock) = ladder_meter();
    meter.feed(6);
    meter.set_period(Horizon::Short, 600);

    assert_eq!(meter.period(Horizon::Short), 600);
    assert_eq!(meter.peak(Horizon::Short).value, 6);

    meter.set_all_periods(None);
    assert_eq!(meter.all_periods(), [3_600, 86_400, 2_592_000]);
}

#[test]
fn test_saturation_is_flagged_not_wrapped() {
    let (mut meter, _clock) = ladder_meter();
    meter.feed(u64::MAX);
    assert_eq!(meter.feed(10), u64::MAX);
    assert!(meter.saturated());
    assert_eq!(meter.peak(Horizon::Long).value, u64::MAX);
}

#[test]
fn test_shared_meter_across_threads() {
    let clock = ManualClock::new(Timestamp::from_secs(T0));
    let shared = Arc::new(SharedMeter::with_clock(clock.clone(), &MeterConfig::nested(2)));

    let feeder = {
        let shared = Arc::clone(&shared);
        std::thread::spawn(move || {
            for _ in 0..1_000 {
                shared.feed(1);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                let mut last = 0;
                for _ in 0..200 {
                    let rate = shared.read_rate(false);
                    // Same instant throughout, so the published rate only grows.
                    assert!(rate >= last);
                    last = rate;
                }
            })
        })
        .collect();

    feeder.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(shared.read_rate(false), 1_000);
    assert_eq!(shared.all_peaks().map(|p| p.value), [1_000, 1_000, 1_000]);
}

//! Peakmeter Probe - feeds a meter at an adjustable speed and reports peaks

mod config;
mod report;

use config::{ProbeConfig, USAGE};
use peakmeter_core::SharedMeter;
use report::format_report;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shortest feed tick; faster speeds feed several events per tick
const MIN_TICK: Duration = Duration::from_millis(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(cfg) = ProbeConfig::load(std::env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let meter = Arc::new(SharedMeter::new(&cfg.meter_config()));
    let speed = Arc::new(AtomicU32::new(cfg.speed));
    let (stop_tx, stop_rx) = watch::channel(false);

    info!(periods = ?meter.all_periods(), speed = cfg.speed, "Starting Peakmeter Probe...");

    let report_every = Duration::from_millis(cfg.report_interval_ms);
    let reporter = if cfg.reader_task {
        info!("Start reader task");
        Some(tokio::spawn(report_loop(
            Arc::clone(&meter),
            Arc::clone(&speed),
            report_every,
            stop_rx.clone(),
        )))
    } else {
        None
    };
    let feeder = tokio::spawn(feed_loop(
        Arc::clone(&meter),
        Arc::clone(&speed),
        (!cfg.reader_task).then_some(report_every),
        stop_rx,
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim().parse::<i64>() {
            Ok(v) if v < 0 => break,
            Ok(v) => {
                let v = u32::try_from(v).unwrap_or(u32::MAX);
                speed.store(v, Ordering::Relaxed);
                println!("Config speed {}", v);
            }
            Err(e) => warn!(input = %line.trim(), error = %e, "Ignoring non-numeric speed"),
        }
    }

    info!("Shutting down...");
    let _ = stop_tx.send(true);
    feeder.await?;
    if let Some(reporter) = reporter {
        reporter.await?;
    }

    let peaks = meter.all_peaks();
    let periods = meter.all_periods();
    println!("{}", format_report(0, meter.read_rate(false), &peaks, &periods));
    info!(stats = ?meter.stats(), saturated = meter.saturated(), "Probe finished");

    Ok(())
}

/// Feed the configured speed, optionally reporting with accurate reads
async fn feed_loop(
    meter: Arc<SharedMeter>,
    speed: Arc<AtomicU32>,
    report_every: Option<Duration>,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(MIN_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut owed = 0f64;
    let mut last_tick = Instant::now();
    let mut last_report = Instant::now();

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                let now = Instant::now();
                let per_sec = speed.load(Ordering::Relaxed);
                owed += now.duration_since(last_tick).as_secs_f64() * f64::from(per_sec);
                last_tick = now;

                // One event at a time, like a real hot path would see them.
                while owed >= 1.0 {
                    meter.feed(1);
                    owed -= 1.0;
                }
                if per_sec == 0 {
                    owed = 0.0;
                }

                if let Some(every) = report_every {
                    if now.duration_since(last_report) >= every {
                        print_report(&meter, per_sec, true);
                        last_report = now;
                    }
                }
            }
        }
    }
}

/// Report from a reader that never rotates the window
async fn report_loop(
    meter: Arc<SharedMeter>,
    speed: Arc<AtomicU32>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = ticker.tick() => print_report(&meter, speed.load(Ordering::Relaxed), false),
        }
    }
}

fn print_report(meter: &SharedMeter, cfg_speed: u32, accurate: bool) {
    let real = meter.read_rate(accurate);
    let peaks = meter.all_peaks();
    let periods = meter.all_periods();
    println!("{}", format_report(cfg_speed, real, &peaks, &periods));
}

//! Daily rate-check scheduler.
//!
//! Drives the monitor: sleeps until the configured UTC fire time, runs one
//! tick, logs its outcome and goes back to sleep. A failed tick is logged
//! and forgotten; the next attempt is simply the next day's fire time.

use std::future::{self, Future};
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, Utc};
use tokio::signal;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::monitor::{RateMonitor, TickError, TickOutcome};

/// A once-a-day schedule anchored at a UTC time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    fire_time: NaiveTime,
}

impl Schedule {
    pub fn daily_at(fire_time: NaiveTime) -> Self {
        Self { fire_time }
    }

    pub fn fire_time(&self) -> NaiveTime {
        self.fire_time
    }

    /// Next occurrence of the fire time strictly after `now`. Landing exactly
    /// on today's fire time counts as already past.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(self.fire_time).and_utc();
        if today > now {
            today
        } else {
            today
                .checked_add_days(Days::new(1))
                .unwrap_or(today)
        }
    }
}

/// Run the daily check loop until `cancel` fires.
///
/// On each iteration:
/// 1. Compute the next fire time (never at or before the previous one)
/// 2. Sleep until then, or return at once if `cancel` fires first
/// 3. Run `monitor.tick()` to completion and log the result
///
/// Tick errors never end the loop. Cancellation is only observed between
/// ticks, so an in-flight fetch or send always finishes.
pub async fn run_daily(monitor: &mut RateMonitor, schedule: Schedule, cancel: CancellationToken) {
    tracing::info!(
        "Rate monitor started (daily at {} UTC)",
        schedule.fire_time().format("%H:%M:%S")
    );

    let mut last_fire: Option<DateTime<Utc>> = None;

    loop {
        let now = Utc::now();
        let reference = match last_fire {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        let next_fire = schedule.next_fire_after(reference);
        let delay = (next_fire - now).to_std().unwrap_or(Duration::ZERO);

        tracing::info!("Next rate check at {}", next_fire.to_rfc3339());

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::info!("Shutdown signal received. Stopping rate monitor.");
                break;
            }

            _ = time::sleep(delay) => {
                last_fire = Some(next_fire);
                let _ = tick_and_log(monitor).await;
            }
        }
    }

    tracing::info!("Rate monitor stopped cleanly");
}

/// Run exactly one tick, for the single-shot run mode.
pub async fn run_once(monitor: &mut RateMonitor) -> Result<TickOutcome, TickError> {
    tracing::info!("Running a single rate check");
    tick_and_log(monitor).await
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Cancel `cancel` once `signal` resolves.
pub async fn cancel_on<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = ()>,
{
    signal.await;
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}

/// Execute a single tick and log its outcome. Extracted for testability.
async fn tick_and_log(monitor: &mut RateMonitor) -> Result<TickOutcome, TickError> {
    let result = monitor.tick().await;
    match &result {
        Ok(outcome) => tracing::info!("Rate check finished: {}", outcome),
        Err(err) => tracing::error!("Rate check failed, waiting for next tick: {}", err),
    }
    result
}

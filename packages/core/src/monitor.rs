//! Rate drop monitor.
//!
//! `RateMonitor` owns the comparison state. Each tick fetches today's rate,
//! normalizes it, compares it with the rate retained from the previous tick
//! and notifies on a strict drop.
//!
//! Comparison policy: the reference is always the most recently observed
//! rate, never a running minimum and never a separate "yesterday" fetch.
//! Every weekday is eligible. A falling streak therefore notifies once per
//! step down.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::alerts::Notifier;
use crate::error::{FetchError, NotifyError};
use crate::rates::{is_drop, RateObservation, RateSource};

/// State retained between ticks. Lives only as long as the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    pub last_rate: Option<RateObservation>,
}

/// What a successful tick decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No prior rate existed; `current` is now the baseline.
    Baseline { current: RateObservation },
    /// Rate held or rose; nothing was sent.
    Unchanged {
        previous: RateObservation,
        current: RateObservation,
    },
    /// Rate fell and the notification was delivered.
    Dropped {
        previous: RateObservation,
        current: RateObservation,
    },
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickOutcome::Baseline { current } => write!(f, "baseline set to {}", current),
            TickOutcome::Unchanged { previous, current } => {
                write!(f, "no drop ({} -> {})", previous, current)
            }
            TickOutcome::Dropped { previous, current } => {
                write!(f, "drop notified ({} -> {})", previous, current)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum TickError {
    #[error("Rate fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Drop notification failed: {0}")]
    Notify(#[from] NotifyError),
}

pub struct RateMonitor {
    source: Arc<dyn RateSource + Send + Sync>,
    notifier: Arc<dyn Notifier + Send + Sync>,
    state: MonitorState,
}

impl RateMonitor {
    /// Create a monitor with empty state; its first tick is a baseline tick.
    pub fn new(
        source: Arc<dyn RateSource + Send + Sync>,
        notifier: Arc<dyn Notifier + Send + Sync>,
    ) -> Self {
        Self {
            source,
            notifier,
            state: MonitorState::default(),
        }
    }

    /// Start from a previously captured state instead of a cold start.
    pub fn with_state(mut self, state: MonitorState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn last_rate(&self) -> Option<&RateObservation> {
        self.state.last_rate.as_ref()
    }

    /// Run one compare-and-maybe-notify cycle.
    ///
    /// A fetch failure leaves the state untouched. Once a fetch succeeds the
    /// retained rate is replaced, even if the notification then fails.
    pub async fn tick(&mut self) -> Result<TickOutcome, TickError> {
        let current = self.source.fetch_rate(None).await?.normalized();

        tracing::debug!("{} reported {}", self.source.provider_name(), current);

        let (outcome, delivery) = match self.state.last_rate.clone() {
            None => (TickOutcome::Baseline { current: current.clone() }, Ok(())),
            Some(previous) if is_drop(&previous, &current) => {
                tracing::info!("Rate dropped from {} to {}, notifying", previous, current);
                let delivery = self.notifier.notify_drop(&previous, &current).await;
                (
                    TickOutcome::Dropped {
                        previous,
                        current: current.clone(),
                    },
                    delivery,
                )
            }
            Some(previous) => (
                TickOutcome::Unchanged {
                    previous,
                    current: current.clone(),
                },
                Ok(()),
            ),
        };

        self.state.last_rate = Some(current);
        delivery?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::alerts::mock::RecordingNotifier;
    use crate::services::mock_rates::MockRateSource;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn obs(rate: &str) -> RateObservation {
        RateObservation::new(Utc::now().date_naive(), dec(rate))
    }

    fn make_monitor(
        source: MockRateSource,
        notifier: RecordingNotifier,
    ) -> (RateMonitor, Arc<MockRateSource>, Arc<RecordingNotifier>) {
        let source = Arc::new(source);
        let notifier = Arc::new(notifier);
        let monitor = RateMonitor::new(source.clone(), notifier.clone());
        (monitor, source, notifier)
    }

    fn seeded(rate: &str) -> MonitorState {
        MonitorState {
            last_rate: Some(obs(rate)),
        }
    }

    // ---- baseline ----

    #[tokio::test]
    async fn first_tick_sets_baseline_without_notifying() {
        let (mut monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rate(dec("6.31")),
            RecordingNotifier::new(),
        );

        let outcome = monitor.tick().await.unwrap();

        assert!(matches!(outcome, TickOutcome::Baseline { .. }));
        assert_eq!(monitor.last_rate().unwrap().rate, dec("6.31"));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn baseline_never_notifies_even_for_tiny_rates() {
        let (mut monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rate(dec("0.01")),
            RecordingNotifier::new(),
        );

        monitor.tick().await.unwrap();

        assert!(notifier.sent().is_empty());
    }

    // ---- drop detection ----

    #[tokio::test]
    async fn lower_rate_notifies_with_both_values() {
        let (monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rate(dec("9.99")),
            RecordingNotifier::new(),
        );
        let mut monitor = monitor.with_state(seeded("10.00"));

        let outcome = monitor.tick().await.unwrap();

        assert!(matches!(outcome, TickOutcome::Dropped { .. }));
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.rate, dec("10.00"));
        assert_eq!(sent[0].1.rate, dec("9.99"));
    }

    #[tokio::test]
    async fn equal_rate_does_not_notify() {
        let (monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rate(dec("10.00")),
            RecordingNotifier::new(),
        );
        let mut monitor = monitor.with_state(seeded("10.00"));

        let outcome = monitor.tick().await.unwrap();

        assert!(matches!(outcome, TickOutcome::Unchanged { .. }));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn higher_rate_does_not_notify_but_updates_state() {
        let (monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rate(dec("10.01")),
            RecordingNotifier::new(),
        );
        let mut monitor = monitor.with_state(seeded("10.00"));

        monitor.tick().await.unwrap();

        assert!(notifier.sent().is_empty());
        assert_eq!(monitor.last_rate().unwrap().rate, dec("10.01"));
    }

    #[tokio::test]
    async fn each_step_of_a_falling_streak_notifies_once() {
        let (mut monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rates([dec("6.40"), dec("6.30"), dec("6.30"), dec("6.20")]),
            RecordingNotifier::new(),
        );

        for _ in 0..4 {
            monitor.tick().await.unwrap();
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!((sent[0].0.rate, sent[0].1.rate), (dec("6.40"), dec("6.30")));
        assert_eq!((sent[1].0.rate, sent[1].1.rate), (dec("6.30"), dec("6.20")));
    }

    #[tokio::test]
    async fn recovery_then_drop_compares_against_latest_not_lowest() {
        let (mut monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rates([dec("6.00"), dec("6.50"), dec("6.40")]),
            RecordingNotifier::new(),
        );

        for _ in 0..3 {
            monitor.tick().await.unwrap();
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.rate, dec("6.50"));
    }

    // ---- rounding ----

    #[tokio::test]
    async fn rate_is_rounded_before_comparison_and_storage() {
        let (monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rate(dec("9.995")),
            RecordingNotifier::new(),
        );
        let mut monitor = monitor.with_state(seeded("10.00"));

        monitor.tick().await.unwrap();

        assert!(notifier.sent().is_empty());
        assert_eq!(monitor.last_rate().unwrap().rate, dec("10.00"));
    }

    // ---- failures ----

    #[tokio::test]
    async fn fetch_failure_leaves_state_untouched() {
        let (monitor, _, notifier) = make_monitor(
            MockRateSource::new()
                .with_error(FetchError::Status { status: 503 })
                .with_rate(dec("9.50")),
            RecordingNotifier::new(),
        );
        let mut monitor = monitor.with_state(seeded("10.00"));

        let err = monitor.tick().await.unwrap_err();
        assert!(matches!(err, TickError::Fetch(_)));
        assert_eq!(monitor.state(), &seeded("10.00"));

        // The next tick still compares against the pre-failure rate.
        monitor.tick().await.unwrap();
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.rate, dec("10.00"));
    }

    #[tokio::test]
    async fn fetch_failure_on_cold_start_keeps_state_empty() {
        let (mut monitor, _, _) = make_monitor(
            MockRateSource::new().with_error(FetchError::malformed("no data")),
            RecordingNotifier::new(),
        );

        assert!(monitor.tick().await.is_err());
        assert!(monitor.last_rate().is_none());
    }

    #[tokio::test]
    async fn notify_failure_still_updates_state() {
        let (monitor, _, notifier) = make_monitor(
            MockRateSource::new().with_rates([dec("9.90"), dec("9.90")]),
            RecordingNotifier::new().failing(),
        );
        let mut monitor = monitor.with_state(seeded("10.00"));

        let err = monitor.tick().await.unwrap_err();
        assert!(matches!(err, TickError::Notify(_)));
        assert_eq!(monitor.last_rate().unwrap().rate, dec("9.90"));

        // Same rate next time: no repeated attempt.
        monitor.tick().await.unwrap();
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn tick_fetches_latest_rate_once() {
        let (mut monitor, source, _) = make_monitor(
            MockRateSource::new().with_rate(dec("6.00")),
            RecordingNotifier::new(),
        );

        monitor.tick().await.unwrap();

        assert_eq!(source.calls(), 1);
    }
}

//! Recording `Notifier` for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::alerts::notifier::Notifier;
use crate::error::NotifyError;
use crate::rates::RateObservation;

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(RateObservation, RateObservation)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail (the attempt is still recorded).
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Every `(previous, current)` pair a delivery was attempted for.
    pub fn sent(&self) -> Vec<(RateObservation, RateObservation)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_drop(
        &self,
        previous: &RateObservation,
        current: &RateObservation,
    ) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((previous.clone(), current.clone()));
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::transport("scripted failure"));
        }
        Ok(())
    }
}

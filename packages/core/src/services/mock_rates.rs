//! Scripted `RateSource` for tests.
//!
//! Responses are served in the order they were queued. Once the queue is
//! empty every further fetch fails with a network error.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::FetchError;
use crate::rates::{RateObservation, RateSource};

#[derive(Debug, Default)]
pub struct MockRateSource {
    responses: Mutex<VecDeque<Result<Decimal, FetchError>>>,
    calls: AtomicUsize,
}

impl MockRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful fetch returning `rate`.
    pub fn with_rate(self, rate: Decimal) -> Self {
        self.push(Ok(rate));
        self
    }

    /// Queue several successful fetches.
    pub fn with_rates(self, rates: impl IntoIterator<Item = Decimal>) -> Self {
        for rate in rates {
            self.push(Ok(rate));
        }
        self
    }

    /// Queue a failing fetch.
    pub fn with_error(self, error: FetchError) -> Self {
        self.push(Err(error));
        self
    }

    /// Number of `fetch_rate` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, response: Result<Decimal, FetchError>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch_rate(&self, date: Option<NaiveDate>) -> Result<RateObservation, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .responses
            .lock()
            .map_err(|_| FetchError::network("mock rate source poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::network("no scripted response left")));

        let day = date.unwrap_or_else(|| Utc::now().date_naive());
        next.map(|rate| RateObservation::new(day, rate))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

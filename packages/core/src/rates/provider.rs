//! Rate Source Interface
//!
//! Provides abstraction layer for different exchange-rate providers

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FetchError;
use crate::rates::types::RateObservation;

/// Trait for exchange-rate providers to keep the monitor source-independent
#[async_trait]
pub trait RateSource {
    /// Fetch the EUR→BRL rate. `None` asks for the latest rate, `Some(date)`
    /// for the historical rate of that day.
    async fn fetch_rate(&self, date: Option<NaiveDate>) -> Result<RateObservation, FetchError>;

    /// Get the name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::FetchError;
use crate::rates::{RateObservation, RateSource};

pub const DEFAULT_BASE_URL: &str = "https://api.currencyapi.com/v3";
pub const BASE_CURRENCY: &str = "EUR";
pub const TARGET_CURRENCY: &str = "BRL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct CurrencyApiClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl CurrencyApiClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| FetchError::network(err.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct CurrencyApiResponse {
    meta: Option<CurrencyApiMeta>,
    data: HashMap<String, CurrencyValue>,
}

#[derive(Debug, Deserialize)]
struct CurrencyApiMeta {
    last_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CurrencyValue {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    value: Decimal,
}

impl CurrencyApiClient {
    async fn get_rates(&self, date: Option<NaiveDate>) -> Result<CurrencyApiResponse, FetchError> {
        let mut query = vec![
            ("apikey", self.api_key.clone()),
            ("base_currency", BASE_CURRENCY.to_string()),
            ("currencies", TARGET_CURRENCY.to_string()),
        ];
        let url = match date {
            Some(day) => {
                query.push(("date", day.format("%Y-%m-%d").to_string()));
                format!("{}/historical", self.base_url)
            }
            None => format!("{}/latest", self.base_url),
        };

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<CurrencyApiResponse>()
            .await
            .map_err(|err| FetchError::malformed(err.to_string()))
    }
}

/// Pull the target-currency rate out of a provider response.
fn extract_observation(
    body: CurrencyApiResponse,
    requested: Option<NaiveDate>,
) -> Result<RateObservation, FetchError> {
    let value = body
        .data
        .get(TARGET_CURRENCY)
        .ok_or_else(|| FetchError::malformed(format!("missing data.{}", TARGET_CURRENCY)))?;

    let rate = value.value;

    if rate <= Decimal::ZERO {
        return Err(FetchError::malformed(format!("non-positive rate {}", rate)));
    }

    let date = requested
        .or_else(|| {
            body.meta
                .and_then(|meta| meta.last_updated_at)
                .map(|at| at.date_naive())
        })
        .unwrap_or_else(|| Utc::now().date_naive());

    Ok(RateObservation::new(date, rate))
}

#[async_trait]
impl RateSource for CurrencyApiClient {
    async fn fetch_rate(&self, date: Option<NaiveDate>) -> Result<RateObservation, FetchError> {
        let body = self.get_rates(date).await?;
        let observation = extract_observation(body, date)?;

        tracing::debug!(
            "Fetched {}→{} rate {} for {}",
            BASE_CURRENCY,
            TARGET_CURRENCY,
            observation.rate,
            observation.date
        );

        Ok(observation)
    }

    fn provider_name(&self) -> &str {
        "currencyapi"
    }
}

//! Core data types for rate observations

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits every rate is normalized to.
pub const RATE_SCALE: u32 = 2;

/// One EUR→BRL rate as reported by the provider for a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl RateObservation {
    pub fn new(date: NaiveDate, rate: Decimal) -> Self {
        Self { date, rate }
    }

    /// Same observation with the rate rounded to [`RATE_SCALE`] digits.
    pub fn normalized(self) -> Self {
        Self {
            date: self.date,
            rate: round_rate(self.rate),
        }
    }
}

impl fmt::Display for RateObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ({})", self.rate, self.date)
    }
}

/// Round half away from zero, so `9.995` becomes `10.00`.
pub fn round_rate(raw: Decimal) -> Decimal {
    raw.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A drop is a strictly lower normalized rate than the previous one.
/// Equal rates never count.
pub fn is_drop(previous: &RateObservation, current: &RateObservation) -> bool {
    round_rate(current.rate) < round_rate(previous.rate)
}

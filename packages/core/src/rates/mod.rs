//! Exchange-rate domain types and the provider abstraction.

pub mod provider;
pub mod types;

pub use provider::RateSource;
pub use types::{is_drop, round_rate, RateObservation, RATE_SCALE};

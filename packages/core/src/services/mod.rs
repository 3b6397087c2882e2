pub mod currency_api;
pub mod mock_rates;

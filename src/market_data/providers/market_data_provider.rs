use async_trait::async_trait;

use crate::market_data::market_data_errors::FetchError;
use crate::market_data::market_data_model::{ExchangeRate, Quote};

/// Boundary to the remote quote provider.
///
/// Callers hand in canonical provider symbols; normalization happens
/// upstream in the pipeline.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError>;

    async fn fetch_exchange_rate(&self, pair_symbol: &str) -> Result<ExchangeRate, FetchError>;
}

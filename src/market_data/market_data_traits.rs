use async_trait::async_trait;

use super::market_data_model::{BatchQuoteResponse, ResolvedQuote};
use crate::errors::Result;

/// Service-facing API consumed by the HTTP layer.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Resolves a single requested ticker.
    async fn get_quote(&self, ticker: &str) -> Result<ResolvedQuote>;

    /// Resolves a batch of tickers; exactly one entry per distinct
    /// requested ticker, failures scoped per ticker.
    async fn resolve_batch(&self, tickers: &[String]) -> Result<BatchQuoteResponse>;
}

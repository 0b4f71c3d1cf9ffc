use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::warn;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;

use super::cache::{QuoteCache, RateCache};
use super::market_data_constants::{MAX_CONCURRENT_FETCHES, REFERENCE_RATE_SYMBOL};
use super::market_data_model::{BatchQuoteResponse, QuoteFailure, ResolvedQuote, TickerOutcome};
use super::market_data_traits::MarketDataServiceTrait;
use super::price_pipeline::PriceFetchPipeline;
use super::providers::MarketDataProvider;
use crate::errors::{Result, ValidationError};
use crate::market_data::market_data_errors::FetchError;
use crate::prices::PriceRepositoryTrait;

/// Fans out per-ticker pipeline calls and aggregates partial results.
///
/// Batches may carry hundreds of tickers, so the fan-out is capped by a
/// semaphore to bound outbound connections; completion order within a
/// batch carries no meaning, callers correlate by ticker key.
pub struct MarketDataService {
    pipeline: Arc<PriceFetchPipeline>,
    rate_cache: Arc<RateCache>,
    provider: Arc<dyn MarketDataProvider>,
    fetch_permits: Arc<Semaphore>,
}

impl MarketDataService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        let cache = Arc::new(QuoteCache::new());
        Self {
            pipeline: Arc::new(PriceFetchPipeline::new(
                cache,
                Arc::clone(&provider),
                price_repository,
            )),
            rate_cache: Arc::new(RateCache::new()),
            provider,
            fetch_permits: Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES)),
        }
    }

    /// Shared reference rate for one batch, fetched at most once.
    ///
    /// A refresh failure with nothing cached downgrades conversion to
    /// best-effort for the whole batch instead of failing it.
    async fn reference_rate(&self) -> Option<Decimal> {
        let provider = Arc::clone(&self.provider);
        match self
            .rate_cache
            .get_or_refresh(move || async move {
                provider.fetch_exchange_rate(REFERENCE_RATE_SYMBOL).await
            })
            .await
        {
            Ok(rate) => Some(rate.rate),
            Err(err) => {
                warn!(
                    "no usable {} rate, conversion disabled: {}",
                    REFERENCE_RATE_SYMBOL, err
                );
                None
            }
        }
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    async fn get_quote(&self, ticker: &str) -> Result<ResolvedQuote> {
        let rate = self.reference_rate().await;
        Ok(self.pipeline.resolve(ticker, rate).await?)
    }

    async fn resolve_batch(&self, tickers: &[String]) -> Result<BatchQuoteResponse> {
        if tickers.is_empty() {
            return Err(
                ValidationError::InvalidInput("tickers list must not be empty".to_string()).into(),
            );
        }

        let rate = self.reference_rate().await;

        // Duplicate requested tickers collapse to one pipeline call; the
        // map is keyed by the original requested string.
        let distinct: Vec<String> = {
            let mut seen = HashSet::new();
            tickers
                .iter()
                .filter(|ticker| seen.insert(ticker.as_str()))
                .cloned()
                .collect()
        };

        let tasks = distinct.into_iter().map(|ticker| {
            let pipeline = Arc::clone(&self.pipeline);
            let permits = Arc::clone(&self.fetch_permits);
            async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let err = FetchError::UpstreamUnavailable(
                            "fetch permits closed".to_string(),
                        );
                        return (
                            ticker.clone(),
                            TickerOutcome::Failed(QuoteFailure::new(&ticker, &err)),
                        );
                    }
                };
                let outcome = match pipeline.resolve(&ticker, rate).await {
                    Ok(resolved) => TickerOutcome::Resolved(resolved),
                    Err(err) => TickerOutcome::Failed(QuoteFailure::new(&ticker, &err)),
                };
                (ticker, outcome)
            }
        });

        Ok(join_all(tasks).await.into_iter().collect::<HashMap<_, _>>())
    }
}

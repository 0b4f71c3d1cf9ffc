use std::sync::Arc;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::cache::QuoteCache;
use super::market_data_constants::REFERENCE_CURRENCY;
use super::market_data_errors::FetchError;
use super::market_data_model::{Quote, QuoteSource, ResolvedQuote};
use super::providers::MarketDataProvider;
use super::symbol_normalizer;
use crate::prices::{PriceRecord, PriceRepositoryTrait};

/// Per-ticker orchestration: cache, remote fetch, persistent fallback.
///
/// One symbol's failure is always recovered locally; the pipeline never
/// propagates anything a batch sibling would have to care about.
pub struct PriceFetchPipeline {
    cache: Arc<QuoteCache>,
    provider: Arc<dyn MarketDataProvider>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
}

impl PriceFetchPipeline {
    pub fn new(
        cache: Arc<QuoteCache>,
        provider: Arc<dyn MarketDataProvider>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        Self {
            cache,
            provider,
            price_repository,
        }
    }

    /// Resolves one requested ticker against cache, provider and the
    /// persisted fallback tier, converting with the batch-shared rate.
    pub async fn resolve(
        &self,
        requested_ticker: &str,
        reference_rate: Option<Decimal>,
    ) -> Result<ResolvedQuote, FetchError> {
        let symbol = symbol_normalizer::normalize(requested_ticker);

        let provider = Arc::clone(&self.provider);
        let fetch_symbol = symbol.clone();
        let fetched = self
            .cache
            .get_or_fetch(&symbol, move || async move {
                provider.fetch_quote(&fetch_symbol).await
            })
            .await;

        match fetched {
            Ok(quote) => {
                self.persist_quote(&quote);
                Ok(build_resolved(
                    requested_ticker,
                    &symbol,
                    &quote,
                    QuoteSource::Live,
                    reference_rate,
                ))
            }
            Err(err) => {
                self.resolve_from_fallback(requested_ticker, &symbol, err, reference_rate)
                    .await
            }
        }
    }

    /// Best-effort write-through of a successfully fetched price.
    ///
    /// Runs detached: a storage failure is logged and swallowed, never
    /// joined into the result of the request that triggered it.
    fn persist_quote(&self, quote: &Quote) {
        let repository = Arc::clone(&self.price_repository);
        let record = PriceRecord {
            ticker: quote.symbol.clone(),
            last_price: quote.price,
            currency: quote.currency.clone(),
            fetched_at: quote.fetched_at,
        };
        tokio::spawn(async move {
            if let Err(err) = repository.upsert(&record).await {
                warn!("failed to persist price for {}: {}", record.ticker, err);
            }
        });
    }

    async fn resolve_from_fallback(
        &self,
        requested_ticker: &str,
        symbol: &str,
        fetch_err: FetchError,
        reference_rate: Option<Decimal>,
    ) -> Result<ResolvedQuote, FetchError> {
        debug!(
            "live quote for {} failed ({}), trying persisted fallback",
            symbol, fetch_err
        );

        match self.price_repository.read(symbol).await {
            Ok(Some(record)) => {
                let (converted, rate_used) =
                    convert_to_reference(record.last_price, &record.currency, reference_rate);
                // The persisted record has no previous close to diff against.
                Ok(ResolvedQuote {
                    ticker: requested_ticker.to_string(),
                    symbol: symbol.to_string(),
                    price: record.last_price,
                    currency: record.currency,
                    change: None,
                    change_percent: None,
                    price_in_reference_currency: converted,
                    reference_rate_used: rate_used,
                    source: QuoteSource::Fallback,
                    fetched_at: record.fetched_at,
                })
            }
            Ok(None) => Err(FetchError::NoFallbackAvailable(
                requested_ticker.to_string(),
            )),
            Err(db_err) => {
                warn!("fallback read for {} failed: {}", symbol, db_err);
                Err(FetchError::NoFallbackAvailable(
                    requested_ticker.to_string(),
                ))
            }
        }
    }
}

fn build_resolved(
    requested_ticker: &str,
    symbol: &str,
    quote: &Quote,
    source: QuoteSource,
    reference_rate: Option<Decimal>,
) -> ResolvedQuote {
    let (converted, rate_used) = convert_to_reference(quote.price, &quote.currency, reference_rate);
    ResolvedQuote {
        ticker: requested_ticker.to_string(),
        symbol: symbol.to_string(),
        price: quote.price,
        currency: quote.currency.clone(),
        change: quote.change(),
        change_percent: quote.change_percent(),
        price_in_reference_currency: converted,
        reference_rate_used: rate_used,
        source,
        fetched_at: quote.fetched_at,
    }
}

/// Best-effort conversion into the reference currency.
///
/// A missing rate yields `None` instead of blocking the primary price.
fn convert_to_reference(
    price: Decimal,
    currency: &str,
    reference_rate: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>) {
    if currency == REFERENCE_CURRENCY {
        return (Some(price), None);
    }
    match reference_rate {
        Some(rate) => (Some(price * rate), Some(rate)),
        None => (None, None),
    }
}

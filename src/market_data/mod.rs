pub(crate) mod cache;
pub(crate) mod market_data_constants;
pub(crate) mod market_data_errors;
pub(crate) mod market_data_model;
pub(crate) mod market_data_service;
pub(crate) mod market_data_traits;
pub(crate) mod price_pipeline;
pub(crate) mod providers;
pub(crate) mod symbol_normalizer;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the public interface
pub use cache::{QuoteCache, RateCache};
pub use market_data_constants::*;
pub use market_data_model::{
    BatchQuoteResponse, ExchangeRate, Quote, QuoteFailure, QuoteSource, ResolvedQuote,
    TickerOutcome,
};
pub use market_data_service::MarketDataService;
pub use market_data_traits::MarketDataServiceTrait;
pub use price_pipeline::PriceFetchPipeline;
pub use symbol_normalizer::normalize;

// Re-export provider types
pub use providers::{MarketDataProvider, YahooChartProvider};

// Re-export error types for convenience
pub use market_data_errors::FetchError;

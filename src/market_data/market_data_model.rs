use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::market_data_errors::FetchError;

/// Quote as returned by the remote provider.
///
/// Immutable once constructed; a refresh produces a new Quote, and
/// conversion derives separate values rather than mutating a cached one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub previous_close: Option<Decimal>,
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn change(&self) -> Option<Decimal> {
        self.previous_close.map(|prev| self.price - prev)
    }

    pub fn change_percent(&self) -> Option<Decimal> {
        self.previous_close.and_then(|prev| {
            if prev.is_zero() {
                None
            } else {
                Some((self.price - prev) / prev * Decimal::ONE_HUNDRED)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub symbol: String,
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// Which tier produced a resolved quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    Live,
    Fallback,
}

/// Per-ticker result of the fetch pipeline, priced in the provider's
/// currency with a best-effort conversion into the reference currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedQuote {
    /// The ticker exactly as the caller requested it
    pub ticker: String,
    /// Canonical provider symbol after normalization
    pub symbol: String,
    pub price: Decimal,
    pub currency: String,
    /// Day change against the previous close, when the provider reports one
    pub change: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub price_in_reference_currency: Option<Decimal>,
    pub reference_rate_used: Option<Decimal>,
    pub source: QuoteSource,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFailure {
    pub ticker: String,
    pub reason: String,
    pub error: String,
}

impl QuoteFailure {
    pub fn new(ticker: &str, err: &FetchError) -> Self {
        Self {
            ticker: ticker.to_string(),
            reason: err.reason().to_string(),
            error: err.to_string(),
        }
    }
}

/// Quote-or-error entry of a batch response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TickerOutcome {
    Resolved(ResolvedQuote),
    Failed(QuoteFailure),
}

impl TickerOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, TickerOutcome::Resolved(_))
    }

    pub fn quote(&self) -> Option<&ResolvedQuote> {
        match self {
            TickerOutcome::Resolved(quote) => Some(quote),
            TickerOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&QuoteFailure> {
        match self {
            TickerOutcome::Resolved(_) => None,
            TickerOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// One entry per distinct requested ticker, keyed by what the caller asked for
pub type BatchQuoteResponse = HashMap<String, TickerOutcome>;

//! Hand-rolled stubs shared by the market data tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use super::market_data_constants::REFERENCE_RATE_SYMBOL;
use super::market_data_errors::FetchError;
use super::market_data_model::{ExchangeRate, Quote};
use super::providers::MarketDataProvider;
use crate::errors::{Result, ValidationError};
use crate::prices::{PriceRecord, PriceRepositoryTrait};

pub(crate) fn quote(symbol: &str, price: Decimal, currency: &str) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price,
        previous_close: None,
        currency: currency.to_string(),
        fetched_at: Utc::now(),
    }
}

/// Scripted provider; counts calls so tests can assert fetch dedup.
pub(crate) struct StubProvider {
    quotes: Mutex<HashMap<String, std::result::Result<Quote, FetchError>>>,
    rate: Mutex<std::result::Result<ExchangeRate, FetchError>>,
    quote_call_count: AtomicUsize,
    rate_call_count: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            quotes: Mutex::new(HashMap::new()),
            rate: Mutex::new(Err(FetchError::UpstreamUnavailable(
                "no rate configured".to_string(),
            ))),
            quote_call_count: AtomicUsize::new(0),
            rate_call_count: AtomicUsize::new(0),
        }
    }

    pub fn with_quote(
        self,
        symbol: &str,
        result: std::result::Result<Quote, FetchError>,
    ) -> Self {
        self.quotes
            .lock()
            .unwrap()
            .insert(symbol.to_string(), result);
        self
    }

    pub fn with_rate(self, rate: Decimal) -> Self {
        *self.rate.lock().unwrap() = Ok(ExchangeRate {
            symbol: REFERENCE_RATE_SYMBOL.to_string(),
            rate,
            fetched_at: Utc::now(),
        });
        self
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_call_count.load(Ordering::SeqCst)
    }

    pub fn rate_calls(&self) -> usize {
        self.rate_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fetch_quote(&self, symbol: &str) -> std::result::Result<Quote, FetchError> {
        self.quote_call_count.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(symbol.to_string())))
    }

    async fn fetch_exchange_rate(
        &self,
        _pair_symbol: &str,
    ) -> std::result::Result<ExchangeRate, FetchError> {
        self.rate_call_count.fetch_add(1, Ordering::SeqCst);
        self.rate.lock().unwrap().clone()
    }
}

/// In-memory stand-in for the persistent price store.
pub(crate) struct MemoryPriceRepository {
    records: Mutex<HashMap<String, PriceRecord>>,
    fail_upserts: bool,
}

impl MemoryPriceRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_upserts: false,
        }
    }

    pub fn failing_upserts(mut self) -> Self {
        self.fail_upserts = true;
        self
    }

    pub fn insert(&self, record: PriceRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.ticker.clone(), record);
    }

    pub fn get(&self, ticker: &str) -> Option<PriceRecord> {
        self.records.lock().unwrap().get(ticker).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl PriceRepositoryTrait for MemoryPriceRepository {
    async fn upsert(&self, record: &PriceRecord) -> Result<()> {
        if self.fail_upserts {
            return Err(ValidationError::InvalidInput("upserts disabled".to_string()).into());
        }
        self.insert(record.clone());
        Ok(())
    }

    async fn read(&self, ticker: &str) -> Result<Option<PriceRecord>> {
        Ok(self.get(ticker))
    }
}

/// Polls the store until the detached write-through lands.
pub(crate) async fn wait_for_record(
    repository: &MemoryPriceRepository,
    ticker: &str,
) -> Option<PriceRecord> {
    for _ in 0..50 {
        if let Some(record) = repository.get(ticker) {
            return Some(record);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}

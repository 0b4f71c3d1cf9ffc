//! In-memory quote cache with TTL and single-flight deduplication

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::debug;

use super::models::CacheEntry;
use crate::market_data::market_data_constants::QUOTE_CACHE_TTL_SECS;
use crate::market_data::market_data_errors::FetchError;
use crate::market_data::market_data_model::Quote;

type SharedFetch = Shared<BoxFuture<'static, Result<Quote, FetchError>>>;

/// Per-symbol TTL cache over the remote provider.
///
/// Concurrent misses for one symbol collapse into a single provider call:
/// the first caller registers a shared in-flight future, later callers
/// attach to it, and the registry entry is dropped the moment the fetch
/// resolves, success or failure.
pub struct QuoteCache {
    entries: Arc<DashMap<String, CacheEntry<Quote>>>,
    in_flight: Arc<DashMap<String, SharedFetch>>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(QUOTE_CACHE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Fresh cached quote for the symbol, if any.
    ///
    /// Expired entries count as misses but are kept in place as the last
    /// known value; they get overwritten by the next successful fetch.
    pub fn get(&self, symbol: &str) -> Option<Quote> {
        fresh_entry(&self.entries, symbol, self.ttl)
    }

    /// Cached quote or the result of exactly one remote fetch.
    ///
    /// `fetch` is only invoked when there is neither a fresh entry nor an
    /// outstanding fetch for the symbol. Errors are shared with all
    /// waiters and never cached.
    pub async fn get_or_fetch<F, Fut>(&self, symbol: &str, fetch: F) -> Result<Quote, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Quote, FetchError>> + Send + 'static,
    {
        if let Some(quote) = self.get(symbol) {
            return Ok(quote);
        }

        let shared = {
            // Atomic get-or-create: no window where two callers both
            // observe "no existing fetch" and both start one.
            let guard = self
                .in_flight
                .entry(symbol.to_string())
                .or_insert_with(|| self.start_fetch(symbol, fetch()));
            guard.value().clone()
        };

        shared.await
    }

    /// Registers the future behind a single-flight entry.
    ///
    /// The future re-checks the entry map before touching the provider: a
    /// racing fetch may have cached the symbol between the caller's miss
    /// and this registration, in which case the fresh entry is served and
    /// the provider call is skipped.
    fn start_fetch<Fut>(&self, symbol: &str, fut: Fut) -> SharedFetch
    where
        Fut: Future<Output = Result<Quote, FetchError>> + Send + 'static,
    {
        debug!("starting fetch for {}", symbol);
        let entries = Arc::clone(&self.entries);
        let in_flight = Arc::clone(&self.in_flight);
        let key = symbol.to_string();
        let ttl = self.ttl;
        async move {
            let result = match fresh_entry(&entries, &key, ttl) {
                Some(quote) => Ok(quote),
                None => {
                    let result = fut.await;
                    if let Ok(quote) = &result {
                        entries.insert(key.clone(), CacheEntry::new(quote.clone()));
                    }
                    result
                }
            };
            // Deregister before any waiter observes the result.
            in_flight.remove(&key);
            result
        }
        .boxed()
        .shared()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

fn fresh_entry(
    entries: &DashMap<String, CacheEntry<Quote>>,
    symbol: &str,
    ttl: Duration,
) -> Option<Quote> {
    entries
        .get(symbol)
        .filter(|entry| entry.is_fresh(ttl))
        .map(|entry| entry.value().value().clone())
}

//! Single-slot exchange rate cache with stale-on-error fallback

use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;

use log::warn;
use tokio::sync::Mutex;

use super::models::CacheEntry;
use crate::market_data::market_data_constants::RATE_CACHE_TTL_SECS;
use crate::market_data::market_data_errors::FetchError;
use crate::market_data::market_data_model::ExchangeRate;

/// TTL cache for the reference exchange rate.
///
/// Deliberately more lenient than [`super::QuoteCache`]: when a refresh
/// fails, the last successfully cached rate is served even past its TTL,
/// because downstream conversion is better off with an approximate rate
/// than with none at all. An error only propagates when no rate was ever
/// cached.
pub struct RateCache {
    slot: RwLock<Option<CacheEntry<ExchangeRate>>>,
    refresh_guard: Mutex<()>,
    ttl: Duration,
}

impl RateCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(RATE_CACHE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            refresh_guard: Mutex::new(()),
            ttl,
        }
    }

    fn fresh(&self) -> Option<ExchangeRate> {
        self.slot.read().ok().and_then(|slot| {
            slot.as_ref()
                .filter(|entry| entry.is_fresh(self.ttl))
                .map(|entry| entry.value().clone())
        })
    }

    fn last_known(&self) -> Option<ExchangeRate> {
        self.slot
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|entry| entry.value().clone()))
    }

    /// Fresh cached rate, or the result of one refresh call.
    ///
    /// Refreshes are serialized so a batch triggers at most one upstream
    /// rate call no matter how many callers race past the TTL check.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<ExchangeRate, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ExchangeRate, FetchError>>,
    {
        if let Some(rate) = self.fresh() {
            return Ok(rate);
        }

        let _guard = self.refresh_guard.lock().await;
        // Another caller may have refreshed while we waited on the guard.
        if let Some(rate) = self.fresh() {
            return Ok(rate);
        }

        match refresh().await {
            Ok(rate) => {
                if let Ok(mut slot) = self.slot.write() {
                    *slot = Some(CacheEntry::new(rate.clone()));
                }
                Ok(rate)
            }
            Err(err) => match self.last_known() {
                Some(rate) => {
                    warn!(
                        "rate refresh for {} failed ({}), serving stale rate",
                        rate.symbol, err
                    );
                    Ok(rate)
                }
                None => Err(err),
            },
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rate(value: Decimal) -> ExchangeRate {
        ExchangeRate {
            symbol: "USDBRL=X".to_string(),
            rate: value,
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_fresh_rate_skips_refresh() {
        let cache = RateCache::new();

        cache
            .get_or_refresh(|| async { Ok(rate(dec!(5.0))) })
            .await
            .unwrap();

        // Refresh closure must not run on a fresh slot.
        let cached = cache
            .get_or_refresh(|| async { panic!("unexpected refresh") })
            .await
            .unwrap();
        assert_eq!(cached.rate, dec!(5.0));
    }

    #[tokio::test]
    async fn test_stale_rate_served_when_refresh_fails() {
        let cache = RateCache::with_ttl(Duration::ZERO);

        cache
            .get_or_refresh(|| async { Ok(rate(dec!(5.0))) })
            .await
            .unwrap();

        // Entry is already expired, refresh fails: stale-on-error.
        let served = cache
            .get_or_refresh(|| async {
                Err(FetchError::UpstreamUnavailable("timeout".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(served.rate, dec!(5.0));
    }

    #[tokio::test]
    async fn test_error_propagates_when_nothing_was_ever_cached() {
        let cache = RateCache::new();

        let err = cache
            .get_or_refresh(|| async {
                Err(FetchError::UpstreamUnavailable("timeout".to_string()))
            })
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::UpstreamUnavailable("timeout".to_string()));
    }

    #[tokio::test]
    async fn test_successful_refresh_replaces_stale_rate() {
        let cache = RateCache::with_ttl(Duration::ZERO);

        cache
            .get_or_refresh(|| async { Ok(rate(dec!(5.0))) })
            .await
            .unwrap();

        let refreshed = cache
            .get_or_refresh(|| async { Ok(rate(dec!(5.2))) })
            .await
            .unwrap();
        assert_eq!(refreshed.rate, dec!(5.2));
    }
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use log::debug;
use reqwest::{header, Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::market_data_provider::MarketDataProvider;
use crate::market_data::market_data_constants::REMOTE_FETCH_TIMEOUT_SECS;
use crate::market_data::market_data_errors::FetchError;
use crate::market_data::market_data_model::{ExchangeRate, Quote};

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

/// Quote provider backed by the Yahoo Finance v8 chart endpoint.
///
/// Every request is bounded by the client-level timeout, so an unbounded
/// upstream call surfaces as `UpstreamUnavailable` rather than stalling
/// a batch.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    currency: Option<String>,
    regular_market_price: Option<f64>,
    #[serde(alias = "chartPreviousClose")]
    previous_close: Option<f64>,
    regular_market_time: Option<i64>,
}

impl YahooChartProvider {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REMOTE_FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: CHART_BASE_URL.to_string(),
        })
    }

    async fn fetch_chart_meta(&self, symbol: &str) -> Result<ChartMeta, FetchError> {
        let url = format!("{}/{}?interval=1d", self.base_url, symbol);
        debug!("fetching chart meta for {}", symbol);

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        // Yahoo answers unknown symbols with a 404 carrying a chart error.
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::UpstreamUnavailable(format!(
                "{} returned HTTP {}",
                symbol, status
            )));
        }

        let payload: ChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        if let Some(error) = payload.chart.error {
            if error.code.eq_ignore_ascii_case("not found") {
                return Err(FetchError::NotFound(symbol.to_string()));
            }
            return Err(FetchError::UpstreamUnavailable(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        payload
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0).meta)
                }
            })
            .ok_or_else(|| FetchError::NotFound(symbol.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let meta = self.fetch_chart_meta(symbol).await?;

        let price = meta
            .regular_market_price
            .and_then(Decimal::from_f64_retain)
            .ok_or_else(|| FetchError::NotFound(symbol.to_string()))?;

        let fetched_at = meta
            .regular_market_time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(Quote {
            symbol: meta.symbol,
            price,
            previous_close: meta.previous_close.and_then(Decimal::from_f64_retain),
            currency: meta.currency.unwrap_or_else(|| "USD".to_string()),
            fetched_at,
        })
    }

    async fn fetch_exchange_rate(&self, pair_symbol: &str) -> Result<ExchangeRate, FetchError> {
        let meta = self.fetch_chart_meta(pair_symbol).await?;

        let rate = meta
            .regular_market_price
            .and_then(Decimal::from_f64_retain)
            .ok_or_else(|| FetchError::NotFound(pair_symbol.to_string()))?;

        let fetched_at = meta
            .regular_market_time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(ExchangeRate {
            symbol: pair_symbol.to_string(),
            rate,
            fetched_at,
        })
    }
}

use async_trait::async_trait;

use super::prices_model::PriceRecord;
use crate::errors::Result;

#[async_trait]
pub trait PriceRepositoryTrait: Send + Sync {
    /// Write-through of the last known price, one row per ticker.
    async fn upsert(&self, record: &PriceRecord) -> Result<()>;
    /// Fallback read when both cache and remote fetch fail.
    async fn read(&self, ticker: &str) -> Result<Option<PriceRecord>>;
}

use diesel::prelude::*;
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use super::prices_model::{PriceRecord, PriceRecordDb};
use super::prices_traits::PriceRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::prices;

pub struct PriceRepository {
    pool: Arc<DbPool>,
}

impl PriceRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceRepositoryTrait for PriceRepository {
    async fn upsert(&self, record: &PriceRecord) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let row = PriceRecordDb::from(record.clone());

        diesel::replace_into(prices::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn read(&self, ticker: &str) -> Result<Option<PriceRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = prices::table
            .find(ticker)
            .first::<PriceRecordDb>(&mut conn)
            .optional()?;

        // A row that fails to parse is useless as a fallback; treat it as
        // absent rather than serving a zeroed price.
        Ok(row.and_then(|db_row| match PriceRecord::try_from(db_row) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("discarding corrupt price row for {}: {}", ticker, err);
                None
            }
        }))
    }
}

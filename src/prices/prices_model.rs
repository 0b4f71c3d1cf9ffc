use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::schema::prices;

/// Last known price for a ticker, used only as a fallback tier.
///
/// One row per ticker, overwritten on every successful remote fetch, so
/// the record is exactly as fresh as the last fetch that succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub ticker: String,
    pub last_price: Decimal,
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
}

/// Database model for the prices table
#[derive(
    Debug, Clone, Queryable, Identifiable, Selectable, Insertable, AsChangeset,
)]
#[diesel(table_name = prices)]
#[diesel(primary_key(ticker))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceRecordDb {
    pub ticker: String,
    pub last_price: String,
    pub currency: String,
    pub fetched_at: String,
}

impl From<PriceRecord> for PriceRecordDb {
    fn from(record: PriceRecord) -> Self {
        Self {
            ticker: record.ticker,
            last_price: record.last_price.to_string(),
            currency: record.currency,
            fetched_at: record.fetched_at.to_rfc3339(),
        }
    }
}

impl TryFrom<PriceRecordDb> for PriceRecord {
    type Error = ValidationError;

    fn try_from(db: PriceRecordDb) -> Result<Self, Self::Error> {
        let last_price = Decimal::from_str(&db.last_price).map_err(|e| {
            ValidationError::InvalidInput(format!("stored price for {}: {}", db.ticker, e))
        })?;
        let fetched_at = DateTime::parse_from_rfc3339(&db.fetched_at)
            .map_err(|e| {
                ValidationError::InvalidInput(format!("stored timestamp for {}: {}", db.ticker, e))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            ticker: db.ticker,
            last_price,
            currency: db.currency,
            fetched_at,
        })
    }
}

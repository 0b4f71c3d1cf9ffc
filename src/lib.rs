pub mod db;

pub mod errors;
pub mod market_data;
pub mod prices;
pub mod schema;

pub use errors::{Error, Result};
pub use market_data::{MarketDataService, MarketDataServiceTrait};

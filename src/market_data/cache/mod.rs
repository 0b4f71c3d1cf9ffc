pub(crate) mod models;
pub(crate) mod quote_cache;
pub(crate) mod rate_cache;

pub use models::CacheEntry;
pub use quote_cache::QuoteCache;
pub use rate_cache::RateCache;

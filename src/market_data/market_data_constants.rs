/// Currency prices are converted into
pub const REFERENCE_CURRENCY: &str = "BRL";

/// Provider symbol for the USD/BRL exchange rate
pub const REFERENCE_RATE_SYMBOL: &str = "USDBRL=X";

/// Exchange suffix appended to bare B3 tickers
pub const BR_EXCHANGE_SUFFIX: &str = ".SA";

/// Market prefixes accepted on user-supplied tickers
pub const MARKET_PREFIX_BR: &str = "BR:";
pub const MARKET_PREFIX_US: &str = "US:";

/// Longest bare symbol assumed to be a B3 listing
pub const BR_TICKER_MAX_LEN: usize = 5;

/// Time constants
pub const QUOTE_CACHE_TTL_SECS: u64 = 30;
pub const RATE_CACHE_TTL_SECS: u64 = 30;
pub const REMOTE_FETCH_TIMEOUT_SECS: u64 = 10;

/// Cap on concurrent pipeline calls within one batch
pub const MAX_CONCURRENT_FETCHES: usize = 8;

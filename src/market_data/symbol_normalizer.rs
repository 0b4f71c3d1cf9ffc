//! Heuristic mapping from user-supplied tickers to provider symbols

use super::market_data_constants::{
    BR_EXCHANGE_SUFFIX, BR_TICKER_MAX_LEN, MARKET_PREFIX_BR, MARKET_PREFIX_US,
};

/// Maps a user-supplied ticker to the provider's canonical symbol.
///
/// A leading `BR:` or `US:` market prefix is stripped, and bare symbols of
/// up to five characters get the `.SA` exchange suffix. Symbols that
/// already carry an exchange suffix (`PETR4.SA`), an FX marker (`BTC-USD`)
/// or a rate pair marker (`USDBRL=X`) are left unchanged.
///
/// This is a heuristic, not a lookup table: short US tickers such as `KO`
/// are misclassified as B3 listings. Known limitation.
pub fn normalize(raw_ticker: &str) -> String {
    let upper = raw_ticker.trim().to_uppercase();

    let bare = upper
        .strip_prefix(MARKET_PREFIX_BR)
        .or_else(|| upper.strip_prefix(MARKET_PREFIX_US))
        .unwrap_or(&upper);

    if has_suffix_marker(bare) {
        return bare.to_string();
    }

    if !bare.is_empty() && bare.len() <= BR_TICKER_MAX_LEN {
        return format!("{}{}", bare, BR_EXCHANGE_SUFFIX);
    }

    bare.to_string()
}

fn has_suffix_marker(symbol: &str) -> bool {
    symbol.contains('.') || symbol.contains('-') || symbol.contains('=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_bare_ticker_gets_sa_suffix() {
        assert_eq!(normalize("PETR4"), "PETR4.SA");
    }

    #[test]
    fn test_br_prefix_is_stripped_before_suffixing() {
        assert_eq!(normalize("BR:VALE3"), "VALE3.SA");
    }

    #[test]
    fn test_us_prefix_is_stripped() {
        assert_eq!(normalize("US:GOOGLE"), "GOOGLE");
    }

    #[test]
    fn test_existing_exchange_suffix_is_kept() {
        assert_eq!(normalize("PETR4.SA"), "PETR4.SA");
        assert_eq!(normalize("VOW3.DE"), "VOW3.DE");
    }

    #[test]
    fn test_fx_markers_are_left_alone() {
        assert_eq!(normalize("BTC-USD"), "BTC-USD");
        assert_eq!(normalize("USDBRL=X"), "USDBRL=X");
    }

    #[test]
    fn test_long_bare_ticker_is_not_suffixed() {
        assert_eq!(normalize("GOOGLE"), "GOOGLE");
    }

    #[test]
    fn test_input_is_uppercased_and_trimmed() {
        assert_eq!(normalize("  petr4 "), "PETR4.SA");
        assert_eq!(normalize("br:vale3"), "VALE3.SA");
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    // Documented limitation of the length heuristic: five characters or
    // fewer is taken to mean a B3 listing even for US symbols.
    #[test]
    fn test_short_us_ticker_is_misclassified() {
        assert_eq!(normalize("US:KO"), "KO.SA");
    }
}

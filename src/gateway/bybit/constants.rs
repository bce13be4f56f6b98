//! Bybit API constants and mappings.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::market::Interval;

// ============================================================================
// Hosts
// ============================================================================

/// REST API host (production)
pub const REST_HOST: &str = "https://api.bybit.com";

/// Market kline endpoint path
pub const KLINE_PATH: &str = "/v5/market/kline";

/// Public spot stream host (production)
pub const SPOT_WS_HOST: &str = "wss://stream.bybit.com/v5/public/spot";

// ============================================================================
// Request parameters
// ============================================================================

/// Market category used for every request
pub const CATEGORY: &str = "spot";

/// Fixed lower time bound of the one-shot history fetch (milliseconds)
pub const HISTORY_START_MS: i64 = 1_731_232_860_000;

/// Maximum number of candles requested by the history fetch
pub const HISTORY_LIMIT: usize = 100;

// ============================================================================
// Interval Mappings
// ============================================================================

/// Map interval to Bybit kline interval code
pub static INTERVAL_TO_BYBIT: Lazy<HashMap<Interval, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(Interval::Minute, "1");
    m.insert(Interval::Hour, "60");
    m.insert(Interval::Daily, "D");
    m
});

/// Kline stream topic for a symbol and interval, e.g. `kline.1.BTCUSDT`.
pub fn kline_topic(interval: Interval, symbol: &str) -> String {
    let code = INTERVAL_TO_BYBIT.get(&interval).copied().unwrap_or("1");
    format!("kline.{}.{}", code, symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kline_topic() {
        assert_eq!(kline_topic(Interval::Minute, "BTCUSDT"), "kline.1.BTCUSDT");
        assert_eq!(kline_topic(Interval::Hour, "ETHUSDT"), "kline.60.ETHUSDT");
        assert_eq!(kline_topic(Interval::Daily, "BTCUSDT"), "kline.D.BTCUSDT");
    }
}

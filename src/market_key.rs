//! Market Key Normalizer
//! Mission: map venue-specific market slugs/identifiers to canonical keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical market identifier. All per-market state is partitioned by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKey {
    #[serde(rename = "BTC_15m")]
    Btc15m,
    #[serde(rename = "ETH_15m")]
    Eth15m,
    #[serde(rename = "BTC_1h")]
    Btc1h,
    #[serde(rename = "ETH_1h")]
    Eth1h,
}

impl MarketKey {
    pub const ALL: [MarketKey; 4] = [
        MarketKey::Btc15m,
        MarketKey::Eth15m,
        MarketKey::Btc1h,
        MarketKey::Eth1h,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKey::Btc15m => "BTC_15m",
            MarketKey::Eth15m => "ETH_15m",
            MarketKey::Btc1h => "BTC_1h",
            MarketKey::Eth1h => "ETH_1h",
        }
    }

    /// Parse an already-canonical string. Does not attempt fuzzy matching.
    pub fn from_canonical(s: &str) -> Option<MarketKey> {
        match s {
            "BTC_15m" => Some(MarketKey::Btc15m),
            "ETH_15m" => Some(MarketKey::Eth15m),
            "BTC_1h" => Some(MarketKey::Btc1h),
            "ETH_1h" => Some(MarketKey::Eth1h),
            _ => None,
        }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a venue-specific market identifier/slug into a canonical
/// [`MarketKey`], if recognizable. Unmatched inputs return `None` and the
/// caller (the integrator) treats the tick as carrying an unknown key: no
/// parameters, no trade.
///
/// Already-canonical input round-trips unchanged. Matching is
/// case-insensitive substring matching: presence of an asset token plus a
/// window token decides the key, regardless of surrounding slug structure.
pub fn normalize_market_key(raw: &str) -> Option<MarketKey> {
    if let Some(key) = MarketKey::from_canonical(raw) {
        return Some(key);
    }

    let lower = raw.to_ascii_lowercase();

    let is_btc = lower.contains("btc") || lower.contains("bitcoin");
    let is_eth = lower.contains("eth") || lower.contains("ethereum");

    let is_15m = lower.contains("15m") || lower.contains("15 min") || lower.contains("15-min");
    let is_1h = lower.contains("1h") || lower.contains("1 hour") || lower.contains("1-hour");

    match (is_btc, is_eth, is_15m, is_1h) {
        (true, false, true, _) => Some(MarketKey::Btc15m),
        (true, false, false, true) => Some(MarketKey::Btc1h),
        (false, true, true, _) => Some(MarketKey::Eth15m),
        (false, true, false, true) => Some(MarketKey::Eth1h),
        _ => None,
    }
}

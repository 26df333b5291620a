//! Core data types shared across the feature computer, policy engine, and
//! integrator: tape state, price history, features, inventory/cadence/
//! session state, and the decision record.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::market_key::MarketKey;

/// UP or DOWN outcome of a binary market. Closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Up,
    Down,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Up => "UP",
            Side::Down => "DOWN",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Up => Side::Down,
            Side::Down => Side::Up,
        }
    }
}

/// A single point-in-time observation of both side prices for a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapeState {
    pub timestamp_ms: i64,
    pub up_price: f64,
    pub down_price: f64,
}

impl TapeState {
    pub fn price(&self, side: Side) -> f64 {
        match side {
            Side::Up => self.up_price,
            Side::Down => self.down_price,
        }
    }
}

/// One entry in a market's bounded price history ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub timestamp_ms: i64,
    pub up_price: f64,
    pub down_price: f64,
}

impl From<TapeState> for PriceHistoryEntry {
    fn from(s: TapeState) -> Self {
        PriceHistoryEntry {
            timestamp_ms: s.timestamp_ms,
            up_price: s.up_price,
            down_price: s.down_price,
        }
    }
}

/// Bounded, oldest-evicted ring of price history entries for one market.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    capacity: usize,
    entries: VecDeque<PriceHistoryEntry>,
}

impl PriceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, entry: PriceHistoryEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceHistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deltas/volatility computed from the current tape state against bounded
/// price history. Pure function output — see `crate::features`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Features {
    pub delta_1s_up: Option<f64>,
    pub delta_1s_down: Option<f64>,
    pub delta_5s_up: Option<f64>,
    pub delta_5s_down: Option<f64>,
    pub delta_30s_up: Option<f64>,
    pub delta_30s_down: Option<f64>,
    pub volatility_5s: Option<f64>,
    pub volatility_30s: Option<f64>,
    pub distance_from_50: f64,
}

impl Features {
    /// `delta_5s_side`: used as the default momentum/reversion signal for
    /// both sides. DOWN-specific logic falls back to this UP-derived
    /// default when `delta_5s_down` is absent; preserved exactly as
    /// observed rather than "fixed".
    pub fn delta_5s_side(&self, side: Side) -> Option<f64> {
        match side {
            Side::Up => self.delta_5s_up,
            Side::Down => self.delta_5s_down.or(self.delta_5s_up),
        }
    }

    pub fn delta_w_side(&self, window_s: u32, side: Side) -> Option<f64> {
        match (window_s, side) {
            (1, Side::Up) => self.delta_1s_up,
            (1, Side::Down) => self.delta_1s_down.or(self.delta_1s_up),
            (5, _) => self.delta_5s_side(side),
            (30, Side::Up) => self.delta_30s_up,
            (30, Side::Down) => self.delta_30s_down.or(self.delta_30s_up),
            _ => None,
        }
    }
}

/// Non-negative share and average-cost inventory for a single market.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InventoryState {
    pub inv_up_shares: f64,
    pub inv_down_shares: f64,
    pub avg_cost_up: f64,
    pub avg_cost_down: f64,
}

/// Epsilon floor used whenever an inventory-imbalance ratio divides by the
/// opposing side's share count.
pub const INVENTORY_RATIO_EPS: f64 = 1e-6;

impl InventoryState {
    pub fn shares(&self, side: Side) -> f64 {
        match side {
            Side::Up => self.inv_up_shares,
            Side::Down => self.inv_down_shares,
        }
    }

    pub fn total_shares(&self) -> f64 {
        self.inv_up_shares + self.inv_down_shares
    }

    /// `inv_up / max(inv_down, eps)`.
    pub fn imbalance_ratio(&self) -> f64 {
        self.inv_up_shares / self.inv_down_shares.max(INVENTORY_RATIO_EPS)
    }

    /// Incorporate a fill: bumps shares and recomputes share-weighted
    /// average cost incrementally.
    pub fn record_fill(&mut self, side: Side, shares: f64, cost: f64) {
        match side {
            Side::Up => {
                let prior_shares = self.inv_up_shares;
                let prior_cost = prior_shares * self.avg_cost_up;
                self.inv_up_shares += shares;
                self.avg_cost_up = if self.inv_up_shares > 0.0 {
                    (prior_cost + cost) / self.inv_up_shares
                } else {
                    0.0
                };
            }
            Side::Down => {
                let prior_shares = self.inv_down_shares;
                let prior_cost = prior_shares * self.avg_cost_down;
                self.inv_down_shares += shares;
                self.avg_cost_down = if self.inv_down_shares > 0.0 {
                    (prior_cost + cost) / self.inv_down_shares
                } else {
                    0.0
                };
            }
        }
    }

    pub fn reset(&mut self) {
        *self = InventoryState::default();
    }
}

/// Rolling cadence tracking: last trade timestamp and a bounded ring of
/// recent trade timestamps used for per-second/per-minute rate limiting.
#[derive(Debug, Clone)]
pub struct CadenceState {
    pub last_trade_ts: Option<i64>,
    recent: VecDeque<i64>,
    capacity: usize,
}

impl CadenceState {
    pub fn new(capacity: usize) -> Self {
        Self {
            last_trade_ts: None,
            recent: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn recent_trades(&self) -> impl Iterator<Item = &i64> {
        self.recent.iter()
    }

    pub fn record_trade(&mut self, now_ms: i64) {
        self.last_trade_ts = Some(now_ms);
        if self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(now_ms);
    }

    pub fn count_since(&self, now_ms: i64, window_ms: i64) -> usize {
        self.recent
            .iter()
            .filter(|&&ts| ts >= now_ms - window_ms && ts <= now_ms)
            .count()
    }
}

/// Per-market trade-count bookkeeping, reset on market switch or inactivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionState {
    pub trades_this_session: u32,
    pub last_activity_ts: Option<i64>,
}

impl SessionState {
    pub fn reset(&mut self) {
        *self = SessionState::default();
    }
}

/// Previous tape state per market, used by the quality filter for
/// timestamp-jump and price-gap checks.
pub type LastPriceSnapshot = Option<TapeState>;

/// Output of one `should_trade` tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub decision_id: uuid::Uuid,
    pub market_key: MarketKey,
    pub timestamp_ms: i64,
    pub should_trade: bool,
    pub side: Option<Side>,
    pub shares: f64,
    pub fill_price: Option<f64>,
    pub reason: Reason,
}

impl Decision {
    pub fn no_trade(market_key: MarketKey, timestamp_ms: i64, reason: Reason) -> Self {
        Decision {
            decision_id: uuid::Uuid::new_v4(),
            market_key,
            timestamp_ms,
            should_trade: false,
            side: None,
            shares: 0.0,
            fill_price: None,
            reason,
        }
    }

    pub fn trade(market_key: MarketKey, timestamp_ms: i64, side: Side, shares: f64, fill_price: f64, reason: Reason) -> Self {
        Decision {
            decision_id: uuid::Uuid::new_v4(),
            market_key,
            timestamp_ms,
            should_trade: true,
            side: Some(side),
            shares,
            fill_price: Some(fill_price),
            reason,
        }
    }
}

/// The closed, stable set of decision reasons.
/// Kept as a tagged enum internally; `as_str`
/// produces the exact stable string used in audit records and any
/// external reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    DataQualityFilterFailed,
    CooldownBlocked,
    CadenceBlocked,
    NoEntryParams,
    NoBandMatch,
    UpPriceNotInBand,
    DownPriceNotInBand,
    MomentumNotMet,
    ReversionNotMet,
    InventoryLimitExceeded,
    RiskLimitExceeded,
    UpPriceBand,
    DownPriceBand,
    MomentumMet,
    ReversionMet,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::DataQualityFilterFailed => "data_quality_filter_failed",
            Reason::CooldownBlocked => "cooldown_blocked",
            Reason::CadenceBlocked => "cadence_blocked",
            Reason::NoEntryParams => "no_entry_params",
            Reason::NoBandMatch => "no_band_match",
            Reason::UpPriceNotInBand => "up_price_not_in_band",
            Reason::DownPriceNotInBand => "down_price_not_in_band",
            Reason::MomentumNotMet => "momentum_not_met",
            Reason::ReversionNotMet => "reversion_not_met",
            Reason::InventoryLimitExceeded => "inventory_limit_exceeded",
            Reason::RiskLimitExceeded => "risk_limit_exceeded",
            Reason::UpPriceBand => "up_price_band",
            Reason::DownPriceBand => "down_price_band",
            Reason::MomentumMet => "momentum_met",
            Reason::ReversionMet => "reversion_met",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

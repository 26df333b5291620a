//! Typed, validated parameter sections. Mirrors the loosely shaped JSON
//! document with tagged variants for closed-set fields, per the guidance
//! against stringly-typed parameters: reject or fall back at load, not at
//! use.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    Momentum,
    Reversion,
    None,
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSelectionMode {
    InventoryDriven,
    EdgeDriven,
    MomentumDriven,
    Alternating,
    FixedPreference,
    Mixed,
}

impl Default for SideSelectionMode {
    fn default() -> Self {
        SideSelectionMode::InventoryDriven
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionModelType {
    SnapshotPrice,
    FixedSlippage,
    MidPrice,
    WorstCase,
}

impl Default for ExecutionModelType {
    fn default() -> Self {
        ExecutionModelType::SnapshotPrice
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditioningVar {
    InventoryImbalanceRatio,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryParams {
    pub up_price_min: Option<f64>,
    pub up_price_max: Option<f64>,
    pub down_price_min: Option<f64>,
    pub down_price_max: Option<f64>,
    pub mode: EntryMode,
    pub momentum_window_s: u32,
    pub momentum_threshold: f64,
}

impl EntryParams {
    /// True when no price band is configured for either side.
    pub fn is_unconfigured(&self) -> bool {
        self.up_price_min.is_none()
            && self.up_price_max.is_none()
            && self.down_price_min.is_none()
            && self.down_price_max.is_none()
    }

    pub fn band_for(&self, side: Side) -> Option<(f64, f64)> {
        match side {
            Side::Up => match (self.up_price_min, self.up_price_max) {
                (Some(lo), Some(hi)) => Some((lo, hi)),
                _ => None,
            },
            Side::Down => match (self.down_price_min, self.down_price_max) {
                (Some(lo), Some(hi)) => Some((lo, hi)),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeParams {
    pub bin_edges: Vec<f64>,
    pub size_table_1d: HashMap<String, f64>,
    pub size_table: Option<HashMap<String, f64>>,
    pub conditioning_var: Option<ConditioningVar>,
    pub inventory_bucket_thresholds: Vec<f64>,
    pub inventory_buckets: Vec<String>,
}

impl SizeParams {
    /// `bin_edges` must have length >= 2 and be
    /// strictly increasing, else sizing for this market falls back to a
    /// constant share of 1.0.
    pub fn has_valid_bins(&self) -> bool {
        self.bin_edges.len() >= 2 && self.bin_edges.windows(2).all(|w| w[0] < w[1])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryParams {
    pub max_up_shares: f64,
    pub max_down_shares: f64,
    pub max_total_shares: f64,
    pub rebalance_ratio_r: f64,
}

impl Default for InventoryParams {
    fn default() -> Self {
        Self {
            max_up_shares: f64::INFINITY,
            max_down_shares: f64::INFINITY,
            max_total_shares: f64::INFINITY,
            rebalance_ratio_r: 0.75,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceParams {
    pub min_inter_trade_ms: i64,
    pub max_trades_per_sec: usize,
    pub max_trades_per_min: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SideSelectionParams {
    pub mode: SideSelectionMode,
    pub preferred_side: Option<Side>,
    pub confidence_gap: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionParams {
    pub model_type: ExecutionModelType,
    pub slippage_offset: f64,
    pub fill_bias_median: f64,
    pub fill_bias_p75: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownParams {
    pub has_time_cooldown: bool,
    pub time_cooldown_seconds: f64,
    pub price_move_threshold: Option<f64>,
    pub has_inventory_lockout: bool,
    pub inventory_lockout_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub max_trades_per_session: u32,
    pub max_imbalance_ratio: f64,
    pub max_exposure_up_shares: f64,
    pub max_exposure_down_shares: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            max_trades_per_session: u32::MAX,
            max_imbalance_ratio: 1.0,
            max_exposure_up_shares: f64::INFINITY,
            max_exposure_down_shares: f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityFilterParams {
    pub max_price_sum_deviation: f64,
    pub timestamp_jump_threshold_seconds: f64,
    pub price_gap_threshold: f64,
}

impl Default for QualityFilterParams {
    fn default() -> Self {
        Self {
            max_price_sum_deviation: 0.05,
            timestamp_jump_threshold_seconds: 30.0,
            price_gap_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetParams {
    pub resets_on_market_switch: bool,
    pub resets_on_inactivity: bool,
    pub inactivity_threshold_hours: f64,
}

/// Full per-market parameter bag, normalized and validated by
/// [`crate::params::ParamStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParams {
    pub entry_params: EntryParams,
    pub size_params: SizeParams,
    pub inventory_params: InventoryParams,
    pub cadence_params: CadenceParams,
    pub side_selection_params: SideSelectionParams,
    pub execution_params: ExecutionParams,
    pub cooldown_params: CooldownParams,
    pub risk_params: RiskParams,
    pub quality_filter_params: QualityFilterParams,
    pub reset_params: ResetParams,
}

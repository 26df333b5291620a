//! Policy Engine (C3) — fill-price simulation.

use crate::params::types::{ExecutionModelType, ExecutionParams};

/// Deterministic function from snapshot price and configured bias to an
/// imputed fill price, used for audit and accounting — not a real
/// order-book simulation (see Non-goals).
pub fn simulate_fill_price(snapshot_side_price: f64, execution_params: &ExecutionParams) -> f64 {
    match execution_params.model_type {
        ExecutionModelType::SnapshotPrice => snapshot_side_price,
        ExecutionModelType::FixedSlippage => snapshot_side_price + execution_params.slippage_offset,
        ExecutionModelType::MidPrice => snapshot_side_price + execution_params.fill_bias_median,
        ExecutionModelType::WorstCase => {
            snapshot_side_price
                + execution_params
                    .fill_bias_p75
                    .unwrap_or(execution_params.fill_bias_median)
        }
    }
}

//! Policy Engine (C3) — data quality filter.

use crate::params::types::QualityFilterParams;
use crate::state::TapeState;

/// Checked against the prior snapshot (if any); the snapshot itself is
/// updated unconditionally by the integrator after this check, pass or
/// fail.
pub fn quality_ok(state: &TapeState, prev: Option<&TapeState>, params: &QualityFilterParams) -> bool {
    let sum_deviation = (state.up_price + state.down_price - 1.0).abs();
    if sum_deviation > params.max_price_sum_deviation {
        return false;
    }

    if let Some(prev) = prev {
        let elapsed_s = (state.timestamp_ms - prev.timestamp_ms) as f64 / 1000.0;
        if elapsed_s > params.timestamp_jump_threshold_seconds {
            return false;
        }
        let gap = (state.up_price - prev.up_price)
            .abs()
            .max((state.down_price - prev.down_price).abs());
        if gap > params.price_gap_threshold {
            return false;
        }
    }

    true
}

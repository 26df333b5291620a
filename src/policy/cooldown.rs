//! Policy Engine (C3) — post-trade cooldown gate.

use crate::params::types::CooldownParams;
use crate::state::{Features, InventoryState};

/// Blocks on a configured time cooldown since the last trade, on
/// insufficient recent price movement, or on an active inventory lockout.
/// Runs before side selection in the integrator pipeline, so the price
/// delta consulted is the generic `delta_5s_up` signal (see the Features
/// helper of the same name for why DOWN doesn't get its own variant here).
pub fn cooldown_ok(
    last_trade_ts: Option<i64>,
    now_ms: i64,
    features: &Features,
    inventory: &InventoryState,
    cooldown_params: &CooldownParams,
) -> bool {
    if let Some(last) = last_trade_ts {
        let elapsed_s = (now_ms - last) as f64 / 1000.0;

        if cooldown_params.has_time_cooldown && elapsed_s < cooldown_params.time_cooldown_seconds {
            return false;
        }

        if let Some(threshold) = cooldown_params.price_move_threshold {
            if elapsed_s < 5.0 {
                let delta = features.delta_5s_up.unwrap_or(0.0);
                if delta.abs() < threshold {
                    return false;
                }
            }
        }
    }

    if cooldown_params.has_inventory_lockout {
        if let Some(threshold) = cooldown_params.inventory_lockout_threshold {
            let total = inventory.total_shares();
            if total > 0.0 {
                let larger_share = inventory.inv_up_shares.max(inventory.inv_down_shares) / total;
                if larger_share > threshold {
                    return false;
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_cooldown_blocks_within_window() {
        let params = CooldownParams {
            has_time_cooldown: true,
            time_cooldown_seconds: 10.0,
            ..Default::default()
        };
        assert!(!cooldown_ok(
            Some(995_000),
            1_000_000,
            &Features::default(),
            &InventoryState::default(),
            &params
        ));
    }

    #[test]
    fn no_prior_trade_never_blocks() {
        let params = CooldownParams {
            has_time_cooldown: true,
            time_cooldown_seconds: 10.0,
            ..Default::default()
        };
        assert!(cooldown_ok(None, 1_000_000, &Features::default(), &InventoryState::default(), &params));
    }

    #[test]
    fn inventory_lockout_blocks_when_imbalanced() {
        let params = CooldownParams {
            has_inventory_lockout: true,
            inventory_lockout_threshold: Some(0.8),
            ..Default::default()
        };
        let inventory = InventoryState {
            inv_up_shares: 90.0,
            inv_down_shares: 10.0,
            ..Default::default()
        };
        assert!(!cooldown_ok(None, 1_000, &Features::default(), &inventory, &params));
    }
}

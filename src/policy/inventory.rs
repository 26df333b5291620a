//! Policy Engine (C3) — inventory cap and rebalance gate.

use crate::params::types::InventoryParams;
use crate::state::{InventoryState, Side};

/// No side flipping: side selection already handled rebalance intent.
/// `rebalance_ratio_R` is informational here; it is consumed by side
/// selection and by the analytics that produced the parameters.
pub fn inventory_ok_and_rebalance(
    inventory: &InventoryState,
    inventory_params: &InventoryParams,
    proposed_side: Side,
) -> Option<Side> {
    if inventory.total_shares() >= inventory_params.max_total_shares {
        return None;
    }

    let per_side_cap = match proposed_side {
        Side::Up => inventory_params.max_up_shares,
        Side::Down => inventory_params.max_down_shares,
    };
    if inventory.shares(proposed_side) >= per_side_cap {
        return None;
    }

    Some(proposed_side)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_inventory_cap() {
        let inventory_params = InventoryParams {
            max_total_shares: 50.0,
            ..Default::default()
        };
        let inventory = InventoryState {
            inv_up_shares: 30.0,
            inv_down_shares: 25.0,
            ..Default::default()
        };
        assert_eq!(inventory_ok_and_rebalance(&inventory, &inventory_params, Side::Up), None);
        assert_eq!(inventory_ok_and_rebalance(&inventory, &inventory_params, Side::Down), None);
    }

    #[test]
    fn per_side_cap_blocks_only_that_side() {
        let inventory_params = InventoryParams {
            max_up_shares: 10.0,
            ..Default::default()
        };
        let inventory = InventoryState {
            inv_up_shares: 10.0,
            inv_down_shares: 0.0,
            ..Default::default()
        };
        assert_eq!(inventory_ok_and_rebalance(&inventory, &inventory_params, Side::Up), None);
        assert_eq!(
            inventory_ok_and_rebalance(&inventory, &inventory_params, Side::Down),
            Some(Side::Down)
        );
    }
}

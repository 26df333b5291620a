//! Policy Engine (C3) — risk limits.
//!
//! A set of simple session/inventory caps, not a portfolio-level Kelly/VaR
//! sizing model — predicting outcomes or optimizing position sizing is out
//! of scope here.

use crate::params::types::RiskParams;
use crate::state::{InventoryState, SessionState};

pub fn risk_ok(session: &SessionState, inventory: &InventoryState, risk_params: &RiskParams) -> bool {
    if session.trades_this_session >= risk_params.max_trades_per_session {
        return false;
    }

    let total = inventory.total_shares();
    if total > 0.0 {
        let larger_share = inventory.inv_up_shares.max(inventory.inv_down_shares) / total;
        if larger_share > risk_params.max_imbalance_ratio {
            return false;
        }
    }

    if inventory.inv_up_shares > risk_params.max_exposure_up_shares {
        return false;
    }
    if inventory.inv_down_shares > risk_params.max_exposure_down_shares {
        return false;
    }

    true
}

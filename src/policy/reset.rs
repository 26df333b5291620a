//! Policy Engine (C3) — inventory/session reset gate.

use crate::params::types::ResetParams;

/// True on market switch (no prior activity, with switch-resets enabled)
/// or after an inactivity gap beyond the configured threshold.
pub fn should_reset_inventory(last_activity_ts: Option<i64>, now_ms: i64, reset_params: &ResetParams) -> bool {
    match last_activity_ts {
        None => reset_params.resets_on_market_switch,
        Some(last) => {
            if !reset_params.resets_on_inactivity {
                return false;
            }
            let elapsed_hours = (now_ms - last) as f64 / 3_600_000.0;
            elapsed_hours > reset_params.inactivity_threshold_hours
        }
    }
}

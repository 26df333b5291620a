//! Policy Engine (C3) — trade cadence gate.

use crate::params::types::CadenceParams;
use crate::state::CadenceState;

/// Blocks on minimum inter-trade spacing or on exceeding the per-second /
/// per-minute trade-rate caps.
pub fn cadence_ok(cadence: &CadenceState, cadence_params: &CadenceParams, now_ms: i64) -> bool {
    if cadence_params.min_inter_trade_ms > 0 {
        if let Some(last) = cadence.last_trade_ts {
            if now_ms - last < cadence_params.min_inter_trade_ms {
                return false;
            }
        }
    }

    if cadence_params.max_trades_per_sec > 0 && cadence.count_since(now_ms, 1_000) >= cadence_params.max_trades_per_sec
    {
        return false;
    }

    if cadence_params.max_trades_per_min > 0
        && cadence.count_since(now_ms, 60_000) >= cadence_params.max_trades_per_min
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_cadence_block() {
        let mut cadence = CadenceState::new(10);
        cadence.record_trade(500);
        let params = CadenceParams {
            min_inter_trade_ms: 2000,
            ..Default::default()
        };
        assert!(!cadence_ok(&cadence, &params, 1000));
    }

    #[test]
    fn scenario_cadence_pass() {
        let mut cadence = CadenceState::new(10);
        cadence.record_trade(995);
        cadence.record_trade(998);
        let params = CadenceParams {
            max_trades_per_sec: 3,
            ..Default::default()
        };
        assert!(cadence_ok(&cadence, &params, 1000));
    }

    #[test]
    fn zero_min_inter_trade_never_blocks() {
        let mut cadence = CadenceState::new(10);
        cadence.record_trade(999);
        let params = CadenceParams::default();
        assert!(cadence_ok(&cadence, &params, 1000));
    }

    #[test]
    fn max_trades_per_sec_blocks_at_cap() {
        let mut cadence = CadenceState::new(10);
        cadence.record_trade(990);
        cadence.record_trade(991);
        let params = CadenceParams {
            max_trades_per_sec: 2,
            ..Default::default()
        };
        assert!(!cadence_ok(&cadence, &params, 1000));
    }
}

//! Policy Integrator (C4)
//! Mission: per-market stateful orchestration. Owns price history, inventory,
//! cadence, and session state; runs the fixed filter pipeline in order and
//! records executions. The integrator is the only mutator of per-market
//! state — the Policy Engine it calls into is pure.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::features::compute_features;
use crate::market_key::MarketKey;
use crate::params::MarketParams;
use crate::policy::{
    cadence_ok, check_side_entry, cooldown_ok, inventory_ok_and_rebalance, quality_ok, risk_ok, select_side,
    should_reset_inventory, simulate_fill_price, size_for_trade,
};
use crate::state::{CadenceState, Decision, InventoryState, PriceHistory, Reason, SessionState, Side, TapeState};

/// Read-only telemetry for one market's current state, exposed via
/// `Core::snapshot` without handing callers mutation access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub market_key: MarketKey,
    pub inventory: InventoryState,
    pub trades_this_session: u32,
    pub last_trade_ts: Option<i64>,
}

/// Side-channel detail from one `should_trade` tick that the audit log
/// needs but `Decision` doesn't carry. Fields default to "not evaluated"
/// (`false`/`None`) when the pipeline exits before the step that would
/// have computed them.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub entry_up_qualifies: bool,
    pub entry_down_qualifies: bool,
    pub price_bucket: Option<(f64, f64)>,
    pub conditioning_bucket: Option<String>,
}

struct MarketState {
    price_history: PriceHistory,
    inventory: InventoryState,
    cadence: CadenceState,
    session: SessionState,
    last_snapshot: Option<TapeState>,
}

impl MarketState {
    fn new(history_capacity: usize, recent_trades_capacity: usize) -> Self {
        Self {
            price_history: PriceHistory::new(history_capacity),
            inventory: InventoryState::default(),
            cadence: CadenceState::new(recent_trades_capacity),
            session: SessionState::default(),
            last_snapshot: None,
        }
    }

    fn should_trade(
        &mut self,
        market_key: MarketKey,
        now_ms: i64,
        up: f64,
        down: f64,
        params: &MarketParams,
    ) -> (Decision, AuditContext) {
        let mut audit_ctx = AuditContext::default();

        // 1. Reset on market switch / inactivity.
        if should_reset_inventory(self.session.last_activity_ts, now_ms, &params.reset_params) {
            self.inventory.reset();
            self.session.reset();
        }
        self.session.last_activity_ts = Some(now_ms);

        // 2. Append to bounded price history.
        let state = TapeState {
            timestamp_ms: now_ms,
            up_price: up,
            down_price: down,
        };
        self.price_history.push(state.into());

        // 3. Quality filter against the prior snapshot; snapshot updates
        //    unconditionally regardless of the check's outcome.
        let quality_pass = quality_ok(&state, self.last_snapshot.as_ref(), &params.quality_filter_params);
        self.last_snapshot = Some(state);
        if !quality_pass {
            return (Decision::no_trade(market_key, now_ms, Reason::DataQualityFilterFailed), audit_ctx);
        }

        // 4. Features.
        let features = compute_features(&state, &self.price_history);

        // 5. Cooldown.
        if !cooldown_ok(self.cadence.last_trade_ts, now_ms, &features, &self.inventory, &params.cooldown_params) {
            return (Decision::no_trade(market_key, now_ms, Reason::CooldownBlocked), audit_ctx);
        }

        // 6. Cadence.
        if !cadence_ok(&self.cadence, &params.cadence_params, now_ms) {
            return (Decision::no_trade(market_key, now_ms, Reason::CadenceBlocked), audit_ctx);
        }

        // 7. Per-side entry signals.
        let entry_up = check_side_entry(Side::Up, up, &features, &params.entry_params);
        let entry_down = check_side_entry(Side::Down, down, &features, &params.entry_params);
        audit_ctx.entry_up_qualifies = entry_up.qualifies;
        audit_ctx.entry_down_qualifies = entry_down.qualifies;

        // 8. Side selection.
        let (side, reason) = select_side(
            &state,
            &features,
            &params.entry_params,
            &params.side_selection_params,
            &self.inventory,
            entry_up,
            entry_down,
        );
        let Some(side) = side else {
            return (Decision::no_trade(market_key, now_ms, reason), audit_ctx);
        };

        // 9. Risk limits.
        if !risk_ok(&self.session, &self.inventory, &params.risk_params) {
            return (Decision::no_trade(market_key, now_ms, Reason::RiskLimitExceeded), audit_ctx);
        }

        // 10. Size lookup.
        let size_result = size_for_trade(&state, &params.size_params, side, &self.inventory);
        audit_ctx.price_bucket = size_result.price_bucket;
        audit_ctx.conditioning_bucket = size_result.conditioning_bucket.clone();
        let shares = size_result.shares;

        // 11. Inventory gate.
        let Some(side) = inventory_ok_and_rebalance(&self.inventory, &params.inventory_params, side) else {
            return (Decision::no_trade(market_key, now_ms, Reason::InventoryLimitExceeded), audit_ctx);
        };

        // 12. Execution model.
        let fill_price = simulate_fill_price(state.price(side), &params.execution_params);

        // 13. Emit.
        (Decision::trade(market_key, now_ms, side, shares, fill_price, reason), audit_ctx)
    }

    fn record_trade_execution(&mut self, now_ms: i64, side: Side, shares: f64, cost: f64) {
        self.inventory.record_fill(side, shares, cost);
        self.cadence.record_trade(now_ms);
        self.session.trades_this_session += 1;
    }

    fn snapshot(&self, market_key: MarketKey) -> MarketSnapshot {
        MarketSnapshot {
            market_key,
            inventory: self.inventory,
            trades_this_session: self.session.trades_this_session,
            last_trade_ts: self.cadence.last_trade_ts,
        }
    }
}

/// Owns every market's state behind a per-market lock: cross-market calls
/// run in parallel, but mutations within a market are always serialized.
pub struct Integrator {
    markets: RwLock<HashMap<MarketKey, Mutex<MarketState>>>,
    history_capacity: usize,
    recent_trades_capacity: usize,
}

impl Integrator {
    pub fn new(history_capacity: usize, recent_trades_capacity: usize) -> Self {
        Self {
            markets: RwLock::new(HashMap::new()),
            history_capacity,
            recent_trades_capacity,
        }
    }

    fn with_market_state<R>(&self, market_key: MarketKey, f: impl FnOnce(&mut MarketState) -> R) -> R {
        if let Some(mutex) = self.markets.read().get(&market_key) {
            return f(&mut mutex.lock());
        }
        let mut markets = self.markets.write();
        let mutex = markets
            .entry(market_key)
            .or_insert_with(|| Mutex::new(MarketState::new(self.history_capacity, self.recent_trades_capacity)));
        f(&mut mutex.lock())
    }

    pub fn should_trade(
        &self,
        market_key: MarketKey,
        now_ms: i64,
        up: f64,
        down: f64,
        params: &MarketParams,
    ) -> (Decision, AuditContext) {
        self.with_market_state(market_key, |ms| ms.should_trade(market_key, now_ms, up, down, params))
    }

    pub fn record_trade_execution(&self, market_key: MarketKey, now_ms: i64, side: Side, shares: f64, cost: f64) {
        self.with_market_state(market_key, |ms| ms.record_trade_execution(now_ms, side, shares, cost));
    }

    pub fn snapshot(&self, market_key: MarketKey) -> Option<MarketSnapshot> {
        self.markets.read().get(&market_key).map(|m| m.lock().snapshot(market_key))
    }
}

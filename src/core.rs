//! `Core` façade: a single value owning the parameter store, the
//! integrator's per-market state, and an optional audit sink. One
//! constructor, no globals, no module-level singletons.

use std::sync::Arc;

use crate::audit::AuditSink;
use crate::config::CoreConfig;
use crate::integrator::{Integrator, MarketSnapshot};
use crate::market_key::MarketKey;
use crate::params::ParamStore;
use crate::state::{Decision, Side};

pub struct Core {
    params: Arc<ParamStore>,
    integrator: Integrator,
    audit: Option<AuditSink>,
}

impl Core {
    pub fn new(config: &CoreConfig) -> Self {
        let params = Arc::new(ParamStore::new(&config.params_path, config.params_poll_interval));
        let integrator = Integrator::new(config.history_capacity, config.recent_trades_capacity);
        let audit = config.audit_enabled.then(|| AuditSink::new(&config.audit_path));

        Self {
            params,
            integrator,
            audit,
        }
    }

    /// Starts the parameter store's background poll loop. Returns the
    /// handle so the host can abort it on shutdown.
    pub fn spawn_param_polling(&self) -> tokio::task::JoinHandle<()> {
        self.params.clone().spawn_polling()
    }

    pub fn should_trade(&self, market_key_raw: &str, now_ms: i64, up: f64, down: f64) -> Option<Decision> {
        let market_key = crate::market_key::normalize_market_key(market_key_raw)?;
        let market_params = self.params.get_market_params(market_key);
        let (decision, audit_ctx) = self.integrator.should_trade(market_key, now_ms, up, down, &market_params);

        if let Some(audit) = &self.audit {
            let fill_model = format!("{:?}", market_params.execution_params.model_type);
            let inventory = self
                .integrator
                .snapshot(market_key)
                .map(|s| s.inventory)
                .unwrap_or_default();
            audit.record_decision(
                &decision,
                up,
                down,
                inventory,
                audit_ctx.entry_up_qualifies,
                audit_ctx.entry_down_qualifies,
                audit_ctx.price_bucket,
                audit_ctx.conditioning_bucket,
                &fill_model,
            );
        }

        Some(decision)
    }

    pub fn record_trade_execution(&self, market_key: MarketKey, now_ms: i64, side: Side, shares: f64, cost: f64) {
        self.integrator.record_trade_execution(market_key, now_ms, side, shares, cost);
    }

    pub fn snapshot(&self, market_key: MarketKey) -> Option<MarketSnapshot> {
        self.integrator.snapshot(market_key)
    }

    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }
}

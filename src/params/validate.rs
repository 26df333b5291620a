//! Parameter document format detection and normalization (C1).
//!
//! The on-disk document may be *market-first* (top-level keys are canonical
//! market keys) or *param-type-first* (top-level keys are section names,
//! each holding a `per_market` map). Market-first is normalized into the
//! param-type-first shape before per-market parameter bags are built.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::market_key::MarketKey;

use super::types::MarketParams;

const SECTION_NAMES: [&str; 10] = [
    "entry_params",
    "size_params",
    "inventory_params",
    "cadence_params",
    "side_selection_params",
    "execution_params",
    "cooldown_params",
    "risk_params",
    "quality_filter_params",
    "reset_params",
];

fn is_market_first(doc: &Value) -> bool {
    let Some(obj) = doc.as_object() else {
        return false;
    };
    let has_market_key = MarketKey::ALL.iter().any(|k| obj.contains_key(k.as_str()));
    let has_section_key = SECTION_NAMES.iter().any(|s| obj.contains_key(*s));
    has_market_key && !has_section_key
}

fn normalize_to_param_type_first(doc: &Value) -> Value {
    if !is_market_first(doc) {
        return doc.clone();
    }
    let obj = doc.as_object().cloned().unwrap_or_default();

    let mut sections = Map::new();
    for section in SECTION_NAMES {
        let mut per_market = Map::new();
        for (market_key_str, market_val) in &obj {
            if let Some(section_val) = market_val.get(section) {
                per_market.insert(market_key_str.clone(), section_val.clone());
            }
        }
        let mut section_doc = Map::new();
        section_doc.insert("per_market".to_string(), Value::Object(per_market));
        sections.insert(section.to_string(), Value::Object(section_doc));
    }
    Value::Object(sections)
}

fn section_for_market<'a>(normalized: &'a Value, section: &str, key: MarketKey) -> Option<&'a Value> {
    normalized.get(section)?.get("per_market")?.get(key.as_str())
}

fn deserialize_section<T: serde::de::DeserializeOwned + Default>(
    normalized: &Value,
    section: &str,
    key: MarketKey,
) -> T {
    section_for_market(normalized, section, key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// `rebalance_ratio_R` is clamped to the open interval `(0.5, 1)`; we
/// represent the open bounds with a tight epsilon since floats can't
/// express an exact open interval.
const REBALANCE_RATIO_EPS: f64 = 1e-4;

fn clamp_rebalance_ratio(r: f64) -> f64 {
    if !r.is_finite() {
        return 0.75;
    }
    r.clamp(0.5 + REBALANCE_RATIO_EPS, 1.0 - REBALANCE_RATIO_EPS)
}

/// Parse a raw JSON document into validated per-market parameter bags.
/// Missing sections default to empty per-market maps, which in turn yield
/// `MarketParams::default()` for any market not explicitly configured.
pub fn parse_document(doc: &Value) -> HashMap<MarketKey, MarketParams> {
    let normalized = normalize_to_param_type_first(doc);

    MarketKey::ALL
        .iter()
        .map(|&key| {
            let mut params = MarketParams {
                entry_params: deserialize_section(&normalized, "entry_params", key),
                size_params: deserialize_section(&normalized, "size_params", key),
                inventory_params: deserialize_section(&normalized, "inventory_params", key),
                cadence_params: deserialize_section(&normalized, "cadence_params", key),
                side_selection_params: deserialize_section(&normalized, "side_selection_params", key),
                execution_params: deserialize_section(&normalized, "execution_params", key),
                cooldown_params: deserialize_section(&normalized, "cooldown_params", key),
                risk_params: deserialize_section(&normalized, "risk_params", key),
                quality_filter_params: deserialize_section(&normalized, "quality_filter_params", key),
                reset_params: deserialize_section(&normalized, "reset_params", key),
            };
            params.inventory_params.rebalance_ratio_r =
                clamp_rebalance_ratio(params.inventory_params.rebalance_ratio_r);
            (key, params)
        })
        .collect()
}

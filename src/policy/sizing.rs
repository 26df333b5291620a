//! Policy Engine (C3) — position sizing.

use crate::params::types::{ConditioningVar, SizeParams};
use crate::state::{InventoryState, Side, TapeState};

/// Half-open interval bucket index for `price` over `bin_edges`. Prices at
/// or below the first edge clamp to bucket 0; prices above the last edge
/// clamp to the last bucket. A price exactly on an interior edge belongs
/// to the bucket to its left (right-closed).
pub fn price_bucket_index(bin_edges: &[f64], price: f64) -> usize {
    let n = bin_edges.len();
    if price <= bin_edges[0] {
        return 0;
    }
    if price > bin_edges[n - 1] {
        return n - 2;
    }
    for i in 0..n - 1 {
        if price > bin_edges[i] && price <= bin_edges[i + 1] {
            return i;
        }
    }
    n - 2
}

/// Pandas-style half-open interval label `"(L, R]"`. Kept as a pure free
/// function separate from the integer bucket index so the string is only
/// ever produced at a parameter-file/audit-log I/O boundary.
pub fn format_bucket_label(lo: f64, hi: f64) -> String {
    format!("({}, {}]", lo, hi)
}

/// Inverse of [`format_bucket_label`], for audit-log reconstruction.
pub fn parse_bucket_label(label: &str) -> Option<(f64, f64)> {
    let inner = label.strip_prefix('(')?.strip_suffix(']')?;
    let (lo, hi) = inner.split_once(", ")?;
    Some((lo.parse().ok()?, hi.parse().ok()?))
}

fn inventory_bucket_index(thresholds: &[f64], ratio: f64, bucket_count: usize) -> usize {
    if bucket_count == 0 {
        return 0;
    }
    for i in 0..thresholds.len().saturating_sub(1) {
        if thresholds[i + 1] >= ratio {
            return i.min(bucket_count - 1);
        }
    }
    bucket_count - 1
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    Some(if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    })
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Shares plus the bucket identity that produced them, for the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeResult {
    pub shares: f64,
    pub price_bucket: Option<(f64, f64)>,
    pub conditioning_bucket: Option<String>,
}

/// `size_for_trade` — bucket lookup with inventory conditioning and a
/// fixed fallback chain, rounded to 4 decimals.
pub fn size_for_trade(state: &TapeState, size_params: &SizeParams, side: Side, inventory: &InventoryState) -> SizeResult {
    if !size_params.has_valid_bins() {
        return SizeResult {
            shares: 1.0,
            price_bucket: None,
            conditioning_bucket: None,
        };
    }
    let price = state.price(side);
    let idx = price_bucket_index(&size_params.bin_edges, price);
    let (lo, hi) = (size_params.bin_edges[idx], size_params.bin_edges[idx + 1]);
    let label = format_bucket_label(lo, hi);

    let (size, conditioning_bucket) = match size_params.conditioning_var {
        Some(ConditioningVar::InventoryImbalanceRatio) => size_with_conditioning(size_params, &label, inventory)
            .map(|(v, inv_label)| (Some(v), Some(inv_label)))
            .unwrap_or((None, None)),
        None => (size_params.size_table_1d.get(&label).copied(), None),
    };

    let size = size
        .or_else(|| size_params.size_table_1d.get(&label).copied())
        .or_else(|| {
            size_params
                .size_table
                .as_ref()
                .and_then(|t| median(&t.values().copied().collect::<Vec<_>>()))
        })
        .unwrap_or(1.0);

    SizeResult {
        shares: round4(size),
        price_bucket: Some((lo, hi)),
        conditioning_bucket,
    }
}

fn size_with_conditioning(size_params: &SizeParams, price_label: &str, inventory: &InventoryState) -> Option<(f64, String)> {
    let table = size_params.size_table.as_ref()?;
    let ratio = inventory.imbalance_ratio();
    let bucket_count = size_params.inventory_buckets.len();
    let idx = inventory_bucket_index(&size_params.inventory_bucket_thresholds, ratio, bucket_count);

    if let Some(inv_label) = size_params.inventory_buckets.get(idx) {
        let key = format!("{}|{}", price_label, inv_label);
        if let Some(v) = table.get(&key) {
            return Some((*v, inv_label.clone()));
        }
    }

    // Fallback: another inventory bucket for the same price label.
    for inv_label in &size_params.inventory_buckets {
        let key = format!("{}|{}", price_label, inv_label);
        if let Some(v) = table.get(&key) {
            return Some((*v, inv_label.clone()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tape(up: f64) -> TapeState {
        TapeState {
            timestamp_ms: 0,
            up_price: up,
            down_price: 1.0 - up,
        }
    }

    #[test]
    fn scenario_bucket_lookup() {
        let size_params = SizeParams {
            bin_edges: vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0],
            size_table_1d: HashMap::from([
                ("(0, 0.2]".to_string(), 5.0),
                ("(0.2, 0.4]".to_string(), 10.0),
                ("(0.4, 0.6]".to_string(), 15.0),
                ("(0.6, 0.8]".to_string(), 20.0),
                ("(0.8, 1]".to_string(), 25.0),
            ]),
            ..Default::default()
        };
        let result = size_for_trade(&tape(0.35), &size_params, Side::Up, &InventoryState::default());
        assert_eq!(result.shares, 10.0);
        assert_eq!(result.price_bucket, Some((0.2, 0.4)));
    }

    #[test]
    fn scenario_inventory_conditioning() {
        let size_params = SizeParams {
            bin_edges: vec![0.0, 0.5, 1.0],
            size_table: Some(HashMap::from([
                ("(0, 0.5]|bucket_0".to_string(), 5.0),
                ("(0, 0.5]|bucket_1".to_string(), 15.0),
                ("(0.5, 1]|bucket_0".to_string(), 10.0),
                ("(0.5, 1]|bucket_1".to_string(), 20.0),
            ])),
            conditioning_var: Some(ConditioningVar::InventoryImbalanceRatio),
            inventory_bucket_thresholds: vec![0.0, 1.0, 2.0],
            inventory_buckets: vec!["bucket_0".to_string(), "bucket_1".to_string()],
            ..Default::default()
        };
        let inv_low = InventoryState {
            inv_up_shares: 50.0,
            inv_down_shares: 100.0,
            ..Default::default()
        };
        let result_low = size_for_trade(&tape(0.3), &size_params, Side::Up, &inv_low);
        assert_eq!(result_low.shares, 5.0);
        assert_eq!(result_low.conditioning_bucket.as_deref(), Some("bucket_0"));

        let inv_high = InventoryState {
            inv_up_shares: 100.0,
            inv_down_shares: 50.0,
            ..Default::default()
        };
        let result_high = size_for_trade(&tape(0.3), &size_params, Side::Up, &inv_high);
        assert_eq!(result_high.shares, 15.0);
        assert_eq!(result_high.conditioning_bucket.as_deref(), Some("bucket_1"));
    }

    #[test]
    fn invalid_bins_fall_back_to_one() {
        let size_params = SizeParams {
            bin_edges: vec![0.5],
            ..Default::default()
        };
        let result = size_for_trade(&tape(0.3), &size_params, Side::Up, &InventoryState::default());
        assert_eq!(result.shares, 1.0);
        assert_eq!(result.price_bucket, None);
    }

    #[test]
    fn bucket_boundary_is_right_closed() {
        let bin_edges = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        assert_eq!(price_bucket_index(&bin_edges, 0.2), 0);
        assert_eq!(price_bucket_index(&bin_edges, 0.0), 0);
        assert_eq!(price_bucket_index(&bin_edges, 1.0), 4);
    }

    #[test]
    fn label_round_trips() {
        assert_eq!(format_bucket_label(0.0, 0.2), "(0, 0.2]");
        assert_eq!(parse_bucket_label("(0, 0.2]"), Some((0.0, 0.2)));
    }
}

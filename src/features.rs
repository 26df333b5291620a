//! Feature Computer (C2)
//! Mission: from the current tape state and bounded price history, compute
//! deltas over 1s/5s/30s windows and rolling volatility. Pure; no I/O.

use crate::state::{Features, PriceHistory, PriceHistoryEntry, TapeState};

const DELTA_WINDOWS_S: [i64; 3] = [1, 5, 30];
const VOLATILITY_WINDOWS_S: [i64; 2] = [5, 30];

/// Nearest history entry to `target_ts`, by absolute timestamp distance.
/// Ties resolve to whichever entry is scanned first (history is in
/// chronological order, so that's the earlier one).
fn nearest_entry(history: &PriceHistory, target_ts: i64) -> Option<&PriceHistoryEntry> {
    history
        .iter()
        .min_by_key(|entry| (entry.timestamp_ms - target_ts).abs())
}

fn population_std_dev(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

/// `compute_features(state, history) -> Features`. Identical inputs always
/// produce identical outputs — no clocks, no randomness.
pub fn compute_features(state: &TapeState, history: &PriceHistory) -> Features {
    let now = state.timestamp_ms;
    let mut features = Features {
        distance_from_50: (state.up_price - 0.5).abs(),
        ..Default::default()
    };

    for window_s in DELTA_WINDOWS_S {
        let target_ts = now - 1000 * window_s;
        let Some(h) = nearest_entry(history, target_ts) else {
            continue;
        };
        if (h.timestamp_ms - target_ts).abs() >= 2000 * window_s {
            continue;
        }
        let delta_up = state.up_price - h.up_price;
        let delta_down = state.down_price - h.down_price;
        match window_s {
            1 => {
                features.delta_1s_up = Some(delta_up);
                features.delta_1s_down = Some(delta_down);
            }
            5 => {
                features.delta_5s_up = Some(delta_up);
                features.delta_5s_down = Some(delta_down);
            }
            30 => {
                features.delta_30s_up = Some(delta_up);
                features.delta_30s_down = Some(delta_down);
            }
            _ => unreachable!(),
        }
    }

    for window_s in VOLATILITY_WINDOWS_S {
        let lower = now - 1000 * window_s;
        let samples: Vec<f64> = history
            .iter()
            .filter(|h| h.timestamp_ms >= lower && h.timestamp_ms <= now)
            .map(|h| h.up_price)
            .collect();
        let vol = population_std_dev(&samples);
        match window_s {
            5 => features.volatility_5s = vol,
            30 => features.volatility_30s = vol,
            _ => unreachable!(),
        }
    }

    features
}

//! Policy Engine (C3) — per-side entry signal.

use crate::params::types::{EntryMode, EntryParams};
use crate::state::{Features, Reason, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideEntryResult {
    pub qualifies: bool,
    pub reason: Reason,
}

/// `check_side_entry(side)` — per-side result feeding side selection.
/// Requires the side's price band (if both bounds are configured) to
/// contain the price inclusively, then applies the mode-specific delta
/// check.
pub fn check_side_entry(side: Side, price: f64, features: &Features, entry_params: &EntryParams) -> SideEntryResult {
    let Some((lo, hi)) = entry_params.band_for(side) else {
        return SideEntryResult {
            qualifies: false,
            reason: Reason::NoBandMatch,
        };
    };

    if price < lo || price > hi {
        let reason = match side {
            Side::Up => Reason::UpPriceNotInBand,
            Side::Down => Reason::DownPriceNotInBand,
        };
        return SideEntryResult {
            qualifies: false,
            reason,
        };
    }

    let band_reason = match side {
        Side::Up => Reason::UpPriceBand,
        Side::Down => Reason::DownPriceBand,
    };

    match entry_params.mode {
        EntryMode::None => SideEntryResult {
            qualifies: true,
            reason: band_reason,
        },
        EntryMode::Momentum => {
            let delta = features.delta_5s_side(side);
            match delta {
                Some(d) if d >= entry_params.momentum_threshold => SideEntryResult {
                    qualifies: true,
                    reason: Reason::MomentumMet,
                },
                _ => SideEntryResult {
                    qualifies: false,
                    reason: Reason::MomentumNotMet,
                },
            }
        }
        EntryMode::Reversion => {
            let delta = features.delta_5s_side(side);
            match delta {
                Some(d) if d <= -entry_params.momentum_threshold => SideEntryResult {
                    qualifies: true,
                    reason: Reason::ReversionMet,
                },
                _ => SideEntryResult {
                    qualifies: false,
                    reason: Reason::ReversionNotMet,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_entry_band_mode_none() {
        let entry_params = EntryParams {
            up_price_min: Some(0.4),
            up_price_max: Some(0.6),
            mode: EntryMode::None,
            ..Default::default()
        };
        let features = Features::default();
        let result = check_side_entry(Side::Up, 0.5, &features, &entry_params);
        assert!(result.qualifies);
        assert_eq!(result.reason, Reason::UpPriceBand);
    }

    #[test]
    fn price_outside_band_rejected() {
        let entry_params = EntryParams {
            up_price_min: Some(0.4),
            up_price_max: Some(0.6),
            mode: EntryMode::None,
            ..Default::default()
        };
        let features = Features::default();
        let result = check_side_entry(Side::Up, 0.7, &features, &entry_params);
        assert!(!result.qualifies);
        assert_eq!(result.reason, Reason::UpPriceNotInBand);
    }

    #[test]
    fn band_inclusive_at_edges() {
        let entry_params = EntryParams {
            down_price_min: Some(0.4),
            down_price_max: Some(0.6),
            mode: EntryMode::None,
            ..Default::default()
        };
        let features = Features::default();
        assert!(check_side_entry(Side::Down, 0.4, &features, &entry_params).qualifies);
        assert!(check_side_entry(Side::Down, 0.6, &features, &entry_params).qualifies);
    }

    #[test]
    fn momentum_requires_threshold() {
        let entry_params = EntryParams {
            up_price_min: Some(0.0),
            up_price_max: Some(1.0),
            mode: EntryMode::Momentum,
            momentum_threshold: 0.01,
            ..Default::default()
        };
        let mut features = Features::default();
        features.delta_5s_up = Some(0.02);
        assert_eq!(
            check_side_entry(Side::Up, 0.5, &features, &entry_params).reason,
            Reason::MomentumMet
        );

        features.delta_5s_up = Some(0.001);
        assert_eq!(
            check_side_entry(Side::Up, 0.5, &features, &entry_params).reason,
            Reason::MomentumNotMet
        );
    }

    #[test]
    fn no_band_configured_does_not_qualify() {
        let entry_params = EntryParams::default();
        let features = Features::default();
        let result = check_side_entry(Side::Up, 0.5, &features, &entry_params);
        assert!(!result.qualifies);
    }
}

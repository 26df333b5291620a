//! Policy Engine (C3) — side selection.

use super::entry::SideEntryResult;
use crate::params::types::{EntryParams, SideSelectionMode, SideSelectionParams};
use crate::state::{Features, InventoryState, Reason, Side, TapeState};

/// Choose the side that brings `inv_up / max(inv_down, eps)` closer to
/// 1.0; ties broken by the side with the larger distance from 0.5.
fn inventory_driven(state: &TapeState, inventory: &InventoryState) -> Side {
    let ratio = inventory.imbalance_ratio();
    if ratio < 1.0 {
        Side::Up
    } else if ratio > 1.0 {
        Side::Down
    } else {
        edge_driven(state)
    }
}

fn edge_driven(state: &TapeState) -> Side {
    let up_edge = (state.up_price - 0.5).abs();
    let down_edge = (state.down_price - 0.5).abs();
    if up_edge >= down_edge {
        Side::Up
    } else {
        Side::Down
    }
}

fn momentum_driven(state: &TapeState, features: &Features, inventory: &InventoryState) -> Side {
    match features.delta_5s_side(Side::Up) {
        Some(d) if d > 0.001 => Side::Up,
        Some(d) if d < -0.001 => Side::Down,
        _ => inventory_driven(state, inventory),
    }
}

/// `select_side` — applied only once both sides independently qualify via
/// `check_side_entry`. If only one qualifies, that side wins outright with
/// its own entry reason. If neither qualifies, the reason distinguishes an
/// entirely unconfigured market (`no_entry_params`) from one whose bands
/// were simply not met (`no_band_match`).
pub fn select_side(
    state: &TapeState,
    features: &Features,
    entry_params: &EntryParams,
    selection_params: &SideSelectionParams,
    inventory: &InventoryState,
    entry_up: SideEntryResult,
    entry_down: SideEntryResult,
) -> (Option<Side>, Reason) {
    match (entry_up.qualifies, entry_down.qualifies) {
        (true, false) => (Some(Side::Up), entry_up.reason),
        (false, true) => (Some(Side::Down), entry_down.reason),
        (false, false) => {
            let reason = if entry_params.is_unconfigured() {
                Reason::NoEntryParams
            } else {
                Reason::NoBandMatch
            };
            (None, reason)
        }
        (true, true) => {
            let side = match selection_params.mode {
                SideSelectionMode::InventoryDriven | SideSelectionMode::Mixed => {
                    inventory_driven(state, inventory)
                }
                SideSelectionMode::EdgeDriven => edge_driven(state),
                SideSelectionMode::MomentumDriven => momentum_driven(state, features, inventory),
                SideSelectionMode::Alternating => inventory_driven(state, inventory),
                SideSelectionMode::FixedPreference => {
                    selection_params.preferred_side.unwrap_or_else(|| inventory_driven(state, inventory))
                }
            };
            let reason = match side {
                Side::Up => entry_up.reason,
                Side::Down => entry_down.reason,
            };
            (Some(side), reason)
        }
    }
}

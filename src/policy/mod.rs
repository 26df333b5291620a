//! Policy Engine (C3)
//! Mission: stateless pure functions the integrator composes into the
//! per-tick filter pipeline. No operation here performs I/O or holds
//! state; the Integrator (C4) owns everything mutable.

pub mod cadence;
pub mod cooldown;
pub mod entry;
pub mod execution;
pub mod inventory;
pub mod quality;
pub mod reset;
pub mod risk;
pub mod side_selection;
pub mod sizing;

pub use cadence::cadence_ok;
pub use cooldown::cooldown_ok;
pub use entry::{check_side_entry, SideEntryResult};
pub use execution::simulate_fill_price;
pub use inventory::inventory_ok_and_rebalance;
pub use quality::quality_ok;
pub use reset::should_reset_inventory;
pub use risk::risk_ok;
pub use side_selection::select_side;
pub use sizing::{format_bucket_label, parse_bucket_label, price_bucket_index, size_for_trade, SizeResult};

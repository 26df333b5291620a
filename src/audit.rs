//! Decision Audit Log (C6)
//! Mission: optional, structured, append-only record of each decision tick
//! for parity debugging. One JSON object per line, appended to an
//! always-growing file — no hash chain, no tamper-evidence, just a stable
//! schema for offline replay comparison.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::market_key::MarketKey;
use crate::policy::format_bucket_label;
use crate::state::{Decision, InventoryState, Reason, Side};

/// One line of the audit log: the full decision context, plus the decision
/// itself. Schema is additive-only going forward.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub decision_id: uuid::Uuid,
    pub timestamp_ms: i64,
    pub market_key: MarketKey,
    pub up_price: f64,
    pub down_price: f64,
    pub price_bucket_label: Option<String>,
    pub conditioning_bucket: Option<String>,
    pub inventory_ratio: f64,
    pub entry_up_qualifies: bool,
    pub entry_down_qualifies: bool,
    pub side: Option<Side>,
    pub reason: Reason,
    pub raw_size: Option<f64>,
    pub capped_size: Option<f64>,
    pub inventory: InventoryState,
    pub fill_model: String,
    pub snapshot_side_price: Option<f64>,
    pub fill_price: Option<f64>,
}

/// Append-only JSONL writer. Tolerates I/O failure without affecting the
/// decision that triggered it — a failed write only logs a warning.
pub struct AuditSink {
    path: PathBuf,
    file: Mutex<Option<std::fs::File>>,
}

impl AuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = open(&path);
        Self {
            path,
            file: Mutex::new(file),
        }
    }

    pub fn append(&self, record: &AuditRecord) {
        let line = match serde_json::to_string(record) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to serialize audit record");
                return;
            }
        };

        let mut guard = self.file.lock();
        if guard.is_none() {
            *guard = open(&self.path);
        }
        let Some(file) = guard.as_mut() else {
            warn!(path = %self.path.display(), "audit sink has no open file; dropping record");
            return;
        };
        if let Err(e) = writeln!(file, "{line}") {
            warn!(error = %e, path = %self.path.display(), "audit write failed");
            *guard = None;
        }
    }

    /// Convenience entry point mirroring the decision-side fields
    /// built from a completed `Decision` plus the
    /// inputs that produced it.
    pub fn record_decision(
        &self,
        decision: &Decision,
        up_price: f64,
        down_price: f64,
        inventory: InventoryState,
        entry_up_qualifies: bool,
        entry_down_qualifies: bool,
        bucket: Option<(f64, f64)>,
        conditioning_bucket: Option<String>,
        fill_model: &str,
    ) {
        let record = AuditRecord {
            decision_id: decision.decision_id,
            timestamp_ms: decision.timestamp_ms,
            market_key: decision.market_key,
            up_price,
            down_price,
            price_bucket_label: bucket.map(|(lo, hi)| format_bucket_label(lo, hi)),
            conditioning_bucket,
            inventory_ratio: inventory.imbalance_ratio(),
            entry_up_qualifies,
            entry_down_qualifies,
            side: decision.side,
            reason: decision.reason,
            raw_size: if decision.should_trade { Some(decision.shares) } else { None },
            capped_size: if decision.should_trade { Some(decision.shares) } else { None },
            inventory,
            fill_model: fill_model.to_string(),
            snapshot_side_price: decision.side.map(|s| match s {
                Side::Up => up_price,
                Side::Down => down_price,
            }),
            fill_price: decision.fill_price,
        };
        self.append(&record);
    }
}

fn open(path: &Path) -> Option<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, path = %parent.display(), "failed to create audit log directory");
                return None;
            }
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "failed to open audit log file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_key::MarketKey;
    use std::io::BufRead;

    #[test]
    fn append_writes_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = AuditSink::new(&path);

        let decision = Decision::trade(MarketKey::Btc15m, 1000, Side::Up, 10.0, 0.51, Reason::UpPriceBand);
        sink.record_decision(
            &decision,
            0.5,
            0.5,
            InventoryState::default(),
            true,
            false,
            Some((0.4, 0.6)),
            None,
            "snapshot_price",
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["market_key"], "BTC_15m");
        assert_eq!(parsed["reason"], "up_price_band");
        assert_eq!(parsed["price_bucket_label"], "(0.4, 0.6]");
    }

    #[test]
    fn append_is_append_only_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        {
            let sink = AuditSink::new(&path);
            let d = Decision::no_trade(MarketKey::Eth1h, 1, Reason::NoEntryParams);
            sink.record_decision(&d, 0.5, 0.5, InventoryState::default(), false, false, None, None, "none");
        }
        {
            let sink = AuditSink::new(&path);
            let d = Decision::no_trade(MarketKey::Eth1h, 2, Reason::NoEntryParams);
            sink.record_decision(&d, 0.5, 0.5, InventoryState::default(), false, false, None, None, "none");
        }

        let file = std::fs::File::open(&path).unwrap();
        let line_count = std::io::BufReader::new(file).lines().count();
        assert_eq!(line_count, 2);
    }
}

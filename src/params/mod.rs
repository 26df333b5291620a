//! Parameter Store (C1)
//! Mission: load, validate, normalize, and hot-reload parameters keyed by
//! market; notify subscribers on change.

pub mod types;
mod validate;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{info, warn};

use crate::market_key::MarketKey;
pub use types::MarketParams;

/// An immutable, fully validated parameter document, one [`MarketParams`]
/// per canonical market key. Cheap to clone (wrapped in `Arc` by the
/// store); readers may hold a reference across a whole decision tick
/// without locking.
#[derive(Debug, Clone, Default)]
pub struct ParamSnapshot {
    pub markets: HashMap<MarketKey, MarketParams>,
}

impl ParamSnapshot {
    pub fn get(&self, key: MarketKey) -> MarketParams {
        self.markets.get(&key).cloned().unwrap_or_default()
    }
}

fn default_snapshot() -> ParamSnapshot {
    ParamSnapshot {
        markets: MarketKey::ALL
            .iter()
            .map(|&k| (k, MarketParams::default()))
            .collect(),
    }
}

fn read_and_parse(path: &Path) -> anyhow::Result<HashMap<MarketKey, MarketParams>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading params file {}", path.display()))?;
    let doc: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing params file {}", path.display()))?;
    Ok(validate::parse_document(&doc))
}

type Subscriber = Box<dyn Fn(&ParamSnapshot) + Send + Sync>;

/// Hot-reloading parameter store. One instance per process; the
/// `Core` façade owns it and hands out cheap `Arc` snapshots.
pub struct ParamStore {
    path: PathBuf,
    poll_interval: Duration,
    snapshot: ArcSwap<ParamSnapshot>,
    last_mtime: Mutex<Option<SystemTime>>,
    last_reload_error: Mutex<Option<String>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl ParamStore {
    /// Loads the initial snapshot synchronously. A missing file or a
    /// malformed document at startup serves empty defaults rather than
    /// failing construction — failure modes never crash the
    /// process.
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        let path = path.into();
        let (snapshot, mtime) = match std::fs::metadata(&path) {
            Ok(meta) => match read_and_parse(&path) {
                Ok(markets) => (ParamSnapshot { markets }, meta.modified().ok()),
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "failed to parse initial parameter file; serving defaults");
                    (default_snapshot(), None)
                }
            },
            Err(_) => (default_snapshot(), None),
        };

        Self {
            path,
            poll_interval,
            snapshot: ArcSwap::from_pointee(snapshot),
            last_mtime: Mutex::new(mtime),
            last_reload_error: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Full immutable snapshot, valid for the duration of one decision
    /// tick even if a reload completes concurrently.
    pub fn get_params(&self) -> Arc<ParamSnapshot> {
        self.snapshot.load_full()
    }

    pub fn get_market_params(&self, market_key: MarketKey) -> MarketParams {
        self.snapshot.load().get(market_key)
    }

    pub fn subscribe(&self, callback: impl Fn(&ParamSnapshot) + Send + Sync + 'static) {
        self.subscribers.lock().push(Box::new(callback));
    }

    #[cfg(test)]
    fn last_reload_error(&self) -> Option<String> {
        self.last_reload_error.lock().clone()
    }

    /// Poll the file's mtime once; reload and swap if it's strictly newer
    /// than the last observed. Returns whether a swap occurred.
    pub fn reload_once(&self) -> bool {
        let meta = match std::fs::metadata(&self.path) {
            Ok(m) => m,
            Err(_) => return false,
        };
        let modified = meta.modified().ok();
        {
            let last = self.last_mtime.lock();
            if let (Some(m), Some(last_m)) = (modified, *last) {
                if m <= last_m {
                    return false;
                }
            }
        }

        match read_and_parse(&self.path) {
            Ok(markets) => {
                *self.last_mtime.lock() = modified;
                *self.last_reload_error.lock() = None;
                let snapshot = Arc::new(ParamSnapshot { markets });
                self.snapshot.store(snapshot.clone());
                info!(path = %self.path.display(), "parameter snapshot reloaded");
                for sub in self.subscribers.lock().iter() {
                    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sub(&snapshot))).is_err() {
                        warn!("parameter subscriber panicked; continuing");
                    }
                }
                true
            }
            Err(e) => {
                let message = e.to_string();
                let mut last_error = self.last_reload_error.lock();
                if last_error.as_deref() != Some(message.as_str()) {
                    warn!(error = %e, path = %self.path.display(), "failed to reload parameter file; keeping previous snapshot");
                    *last_error = Some(message);
                }
                false
            }
        }
    }

    /// Spawn the background poll loop. Dropping the returned handle does
    /// not stop polling; call `.abort()` on it to stop.
    pub fn spawn_polling(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let poll_interval = self.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.reload_once();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_serves_defaults() {
        let store = ParamStore::new("/nonexistent/path/params.json", Duration::from_secs(3));
        let snap = store.get_params();
        assert_eq!(snap.markets.len(), MarketKey::ALL.len());
    }

    #[test]
    fn reload_picks_up_changed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"BTC_15m":{"entry_params":{"up_price_min":0.1}}}"#).unwrap();

        let store = ParamStore::new(&path, Duration::from_millis(1));
        assert_eq!(
            store.get_market_params(MarketKey::Btc15m).entry_params.up_price_min,
            Some(0.1)
        );

        std::thread::sleep(Duration::from_millis(20));
        let mut f = std::fs::OpenOptions::new().write(true).truncate(true).open(&path).unwrap();
        write!(f, r#"{{"BTC_15m":{{"entry_params":{{"up_price_min":0.4}}}}}}"#).unwrap();
        drop(f);

        assert!(store.reload_once());
        assert_eq!(
            store.get_market_params(MarketKey::Btc15m).entry_params.up_price_min,
            Some(0.4)
        );
    }

    #[test]
    fn malformed_json_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"BTC_15m":{"entry_params":{"up_price_min":0.1}}}"#).unwrap();

        let store = ParamStore::new(&path, Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&path, "{not valid json").unwrap();

        assert!(!store.reload_once());
        assert_eq!(
            store.get_market_params(MarketKey::Btc15m).entry_params.up_price_min,
            Some(0.1)
        );
    }

    #[test]
    fn repeated_identical_parse_errors_are_recorded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"BTC_15m":{"entry_params":{"up_price_min":0.1}}}"#).unwrap();

        let store = ParamStore::new(&path, Duration::from_millis(1));
        assert_eq!(store.last_reload_error(), None);

        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&path, "{not valid json").unwrap();
        assert!(!store.reload_once());
        let first_error = store.last_reload_error();
        assert!(first_error.is_some());

        // Touch the file without changing its content: a new mtime, same
        // parse error. The recorded error string stays identical, which is
        // what the poll loop uses to avoid re-warning every tick.
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&path, "{not valid json").unwrap();
        assert!(!store.reload_once());
        assert_eq!(store.last_reload_error(), first_error);

        // A fix clears the recorded error so a later distinct failure would
        // warn again.
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&path, r#"{"BTC_15m":{"entry_params":{"up_price_min":0.2}}}"#).unwrap();
        assert!(store.reload_once());
        assert_eq!(store.last_reload_error(), None);
    }

    #[test]
    fn subscribers_notified_on_swap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, "{}").unwrap();

        let store = ParamStore::new(&path, Duration::from_millis(1));
        let seen = Arc::new(parking_lot::Mutex::new(false));
        let seen2 = seen.clone();
        store.subscribe(move |_snap| {
            *seen2.lock() = true;
        });

        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&path, r#"{"BTC_15m":{}}"#).unwrap();
        assert!(store.reload_once());
        assert!(*seen.lock());
    }
}

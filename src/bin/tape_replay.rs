//! Demo CLI: replays a local JSONL tape file through `Core` and prints
//! each decision. Local-file replay only — no venue connectivity.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use tracing::{error, info};
use updown_policy_core::{Core, CoreConfig};

#[derive(Debug, Parser)]
#[command(name = "tape-replay", about = "Replay a local JSONL price tape through the policy core")]
struct Args {
    /// Path to a JSONL file of {market_key, timestamp_ms, up_price, down_price} records.
    #[arg(long)]
    tape: PathBuf,

    /// Parameter document path. Defaults to PARAMS_PATH / the built-in default.
    #[arg(long, env = "PARAMS_PATH")]
    params: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TapeRecord {
    market_key: String,
    timestamp_ms: i64,
    up_price: f64,
    down_price: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = CoreConfig::from_env();
    if let Some(params_path) = args.params {
        config.params_path = params_path;
    }
    let core = Core::new(&config);

    let file = std::fs::File::open(&args.tape)?;
    let reader = std::io::BufReader::new(file);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: TapeRecord = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                error!(line = line_no, error = %e, "skipping malformed tape record");
                continue;
            }
        };

        match core.should_trade(&record.market_key, record.timestamp_ms, record.up_price, record.down_price) {
            Some(decision) if decision.should_trade => {
                info!(
                    market_key = %decision.market_key,
                    side = ?decision.side,
                    shares = decision.shares,
                    fill_price = ?decision.fill_price,
                    reason = %decision.reason,
                    "trade"
                );
            }
            Some(decision) => {
                info!(market_key = %decision.market_key, reason = %decision.reason, "no-trade");
            }
            None => {
                info!(market_key = %record.market_key, "unrecognized market key, skipping");
            }
        }
    }

    Ok(())
}

use std::time::Duration;

use updown_policy_core::market_key::MarketKey;
use updown_policy_core::params::ParamStore;

#[test]
fn store_reloads_a_real_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");
    std::fs::write(
        &path,
        r#"{
            "BTC_15m": {
                "entry_params": { "up_price_min": 0.4, "up_price_max": 0.6 }
            }
        }"#,
    )
    .unwrap();

    let store = ParamStore::new(&path, Duration::from_millis(1));
    let params = store.get_market_params(MarketKey::Btc15m);
    assert_eq!(params.entry_params.up_price_min, Some(0.4));

    std::thread::sleep(Duration::from_millis(20));
    std::fs::write(
        &path,
        r#"{
            "BTC_15m": {
                "entry_params": { "up_price_min": 0.1, "up_price_max": 0.9 }
            }
        }"#,
    )
    .unwrap();

    assert!(store.reload_once());
    let params = store.get_market_params(MarketKey::Btc15m);
    assert_eq!(params.entry_params.up_price_min, Some(0.1));
    assert_eq!(params.entry_params.up_price_max, Some(0.9));
}

#[test]
fn param_type_first_layout_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");
    std::fs::write(
        &path,
        r#"{
            "size_params": {
                "per_market": {
                    "ETH_1h": {
                        "bin_edges": [0.0, 0.5, 1.0],
                        "size_table_1d": { "(0, 0.5]": 3.0, "(0.5, 1]": 7.0 }
                    }
                }
            }
        }"#,
    )
    .unwrap();

    let store = ParamStore::new(&path, Duration::from_secs(3));
    let params = store.get_market_params(MarketKey::Eth1h);
    assert_eq!(params.size_params.bin_edges, vec![0.0, 0.5, 1.0]);
}

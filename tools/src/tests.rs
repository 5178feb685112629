use crate::{decode_json, encode_json, patch_genesis, AppConfig, ConfigPaths, QuorumReport};
use assert_matches::assert_matches;
use ibc_testnet_roles::{ChainConfig, PrivValidatorKeyFile, TypedKey};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

const ALPHA: &str = "A1B2C3D4E5F60718293A4B5C6D7E8F9011223344";
const ALPHA_CONS: &str = "cosmosvalcons15xev84897cr3s2f6fdwx6l50jqgjyv6yyjk2ja";
const NODE0: &str = "1111111111111111111111111111111111111111";
const NODE0_CONS: &str = "cosmosvalcons1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3s6stja";

fn gaia() -> ChainConfig {
    ChainConfig::heighliner("gaia", "gaiad", "cosmos", "uatom", "0.025uatom", 1.3, "330h")
}

fn osmosis() -> ChainConfig {
    ChainConfig::heighliner("osmosis", "osmosisd", "osmo", "uosmo", "0.0025uosmo", 1.3, "336h")
}

fn genesis(address: &str, pub_key: &str, cons: &str) -> String {
    format!(
        r#"{{"chain_id": "cosmoshub-test-1",
 "validators": [
  {{"address": "{address}", "power": "90", "pub_key": {{"type": "tendermint/PubKeyEd25519", "value": "{pub_key}"}}}},
  {{"address": "0000000000000000000000000000000000000000", "power": "10", "pub_key": {{"type": "tendermint/PubKeyEd25519", "value": "YmV0YQ=="}}}}
 ],
 "app_state": {{"slashing": {{"signing_infos": [{{"address": "{cons}"}}]}}}}
}}"#
    )
}

fn write_key_file(dir: &std::path::Path) -> PathBuf {
    let key = PrivValidatorKeyFile {
        address: NODE0.to_owned(),
        pub_key: TypedKey {
            key_type: "tendermint/PubKeyEd25519".to_owned(),
            value: "bm9kZTA=".to_owned(),
        },
        priv_key: TypedKey {
            key_type: "tendermint/PrivKeyEd25519".to_owned(),
            value: "c2VjcmV0".to_owned(),
        },
    };
    let path = dir.join("priv_validator_key.json");
    std::fs::write(&path, key.encode().unwrap()).unwrap();
    path
}

#[test]
fn patch_genesis_with_key_files() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = write_key_file(dir.path());
    let reference = genesis(ALPHA, "YWxwaGE=", ALPHA_CONS);
    let patched = patch_genesis(reference.into_bytes(), &[key_file], "cosmos").unwrap();
    assert_eq!(
        String::from_utf8(patched).unwrap(),
        genesis(NODE0, "bm9kZTA=", NODE0_CONS)
    );
}

#[test]
fn patch_genesis_missing_key_file() {
    let dir = tempfile::tempdir().unwrap();
    let reference = genesis(ALPHA, "YWxwaGE=", ALPHA_CONS);
    let missing = dir.path().join("missing.json");
    assert!(patch_genesis(reference.into_bytes(), &[missing], "cosmos").is_err());
}

#[test]
fn quorum_report() {
    let report = QuorumReport::new(genesis(ALPHA, "YWxwaGE=", ALPHA_CONS).as_bytes()).unwrap();
    assert_eq!(report.validators, 2);
    assert_eq!(report.total_power, "100");
    assert_eq!(report.threshold, "67");
    assert_eq!(report.selected.len(), 1);
    assert_eq!(report.selected[0].address, ALPHA);
    assert_eq!(report.selected[0].power, 90);
}

#[test]
fn config_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = AppConfig::default_for(gaia(), osmosis().with_chain_id("osmosis-test-1"));
    cfg.num_validators = 2;
    cfg.num_full_nodes = 1;
    let path = dir.path().join("config.json");
    std::fs::write(&path, encode_json(&cfg).unwrap()).unwrap();
    assert_eq!(ConfigPaths { config: &path }.read().unwrap(), cfg);
}

#[test]
fn config_defaults() {
    let raw = format!(
        r#"{{"src": {}, "dst": {}}}"#,
        serde_json::to_string(&gaia()).unwrap(),
        serde_json::to_string(&osmosis()).unwrap(),
    );
    let cfg: AppConfig = decode_json(&raw).unwrap();
    assert_eq!(cfg, AppConfig::default_for(gaia(), osmosis()));
    cfg.validate().unwrap();
}

#[test]
fn decode_json_rejects_trailing_data() {
    assert_matches!(decode_json::<u64>("1 2"), Err(_));
}

#[test]
fn invalid_configs() {
    let mut cfg = AppConfig::default_for(gaia(), gaia());
    assert!(cfg.validate().is_err());

    cfg.dst = osmosis();
    cfg.num_validators = 0;
    assert!(cfg.validate().is_err());

    cfg.num_validators = 1;
    cfg.src.gas_prices = "0.025uosmo".to_owned();
    assert!(cfg.validate().is_err());
}

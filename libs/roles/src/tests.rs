use crate::{config::GasPriceError, ChainConfig, GasPrice, IbcTimeout, WalletAmount};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_casing::test_casing;

fn gaia() -> ChainConfig {
    ChainConfig::heighliner("gaia", "gaiad", "cosmos", "uatom", "0.025uatom", 1.3, "330h")
}

#[test]
fn heighliner_config() {
    let cfg = gaia().with_chain_id("cosmoshub-test-1").with_image_version("v7.0.3");
    assert_eq!(cfg.chain_type, "cosmos");
    assert_eq!(cfg.chain_id, "cosmoshub-test-1");
    assert_eq!(
        cfg.images[0].reference(),
        "ghcr.io/strangelove-ventures/heighliner/gaia:v7.0.3"
    );
}

#[test]
fn config_json_uses_type_field() {
    let json = serde_json::to_value(gaia()).unwrap();
    assert_eq!(json["type"], "cosmos");
    let back: ChainConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back, gaia());
}

#[test_casing(5, [
    ("0.025", 80_000, 2_000),
    ("0.000025", 80_000, 2),
    ("0.01", 123_456, 1_234),
    ("1", 7, 7),
    ("0", 1_000_000, 0),
])]
#[test]
fn gas_fees(price: &str, gas: i64, want: i64) {
    let price: GasPrice = price.parse().unwrap();
    assert_eq!(price.fees(gas), want);
}

#[test]
fn gas_fees_from_config() {
    assert_eq!(gaia().gas_fees(80_000).unwrap(), 2_000);
    let other_denom = ChainConfig {
        gas_prices: "0.025uosmo".to_owned(),
        ..gaia()
    };
    assert!(other_denom.gas_fees(80_000).is_err());
}

#[test]
fn gas_price_parse_errors() {
    assert_matches!("".parse::<GasPrice>(), Err(GasPriceError::NotDecimal(_)));
    assert_matches!(".".parse::<GasPrice>(), Err(GasPriceError::NotDecimal(_)));
    assert_matches!("-1".parse::<GasPrice>(), Err(GasPriceError::NotDecimal(_)));
    assert_matches!("1e-3".parse::<GasPrice>(), Err(GasPriceError::NotDecimal(_)));
    assert_matches!(
        "123456789012345678901234567890".parse::<GasPrice>(),
        Err(GasPriceError::Overflow(_))
    );
    assert_eq!(".5".parse::<GasPrice>().unwrap().fees(10), 5);
}

#[test]
fn wallet_amount_coin() {
    let w = WalletAmount {
        address: "cosmos1xyz".to_owned(),
        denom: "uatom".to_owned(),
        amount: 1_000_000,
    };
    assert_eq!(w.coin().to_string(), "1000000uatom");
    assert_eq!(IbcTimeout::default(), IbcTimeout::DISABLED);
}

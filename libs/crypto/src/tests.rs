use crate::{
    bech32,
    denom::{self, DenomTrace},
    sha256::Sha256,
};
use pretty_assertions::assert_eq;
use test_casing::test_casing;

#[test_casing(3, [
    ("A1B2C3D4E5F60718293A4B5C6D7E8F9011223344", "cosmos", "cosmosvalcons15xev84897cr3s2f6fdwx6l50jqgjyv6yyjk2ja"),
    ("1111111111111111111111111111111111111111", "cosmos", "cosmosvalcons1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3s6stja"),
    ("a1b2c3d4e5f60718293a4b5c6d7e8f9011223344", "osmo", "osmovalcons15xev84897cr3s2f6fdwx6l50jqgjyv6yn2evlm"),
])]
#[test]
fn valcons_address(hex_address: &str, prefix: &str, want: &str) {
    assert_eq!(bech32::valcons_address(prefix, hex_address).unwrap(), want);
}

#[test]
fn valcons_address_rejects_non_hex() {
    assert!(bech32::valcons_address("cosmos", "not-hex").is_err());
}

#[test_casing(2, [
    ("A1B2C3D4E5F60718293A4B5C6D7E8F9011223344", "cosmos", "cosmos15xev84897cr3s2f6fdwx6l50jqgjyv6y443rj0"),
    ("1111111111111111111111111111111111111111", "osmo", "osmo1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3fxyjya"),
])]
#[test]
fn account_address(hex_address: &str, prefix: &str, want: &str) {
    let raw = hex::decode(hex_address).unwrap();
    assert_eq!(bech32::account_address(prefix, &raw).unwrap(), want);
}

#[test]
fn account_address_rejects_bad_prefix() {
    assert!(bech32::account_address("Cosmos Hub", &[1, 2, 3]).is_err());
}

#[test_casing(3, [
    ("transfer", "channel-0", "uatom", "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"),
    ("transfer", "channel-1", "uosmo", "ibc/0471F1C4E7AFD3F07702BEF6DC365268D64570F7C1FDC98EA6098DD6DE59817B"),
    ("transfer", "channel-0", "ujuno", "ibc/04F5F501207C3626A2C14BFEF654D51C2E0B8F7CA578AB8ED272A66FE4E48097"),
])]
#[test]
fn ibc_denom(port: &str, channel: &str, base: &str, want: &str) {
    assert_eq!(denom::ibc_denom(port, channel, base), want);
}

#[test]
fn denom_trace_parsing() {
    assert_eq!(
        DenomTrace::parse("uatom"),
        DenomTrace {
            path: String::new(),
            base_denom: "uatom".to_owned()
        }
    );
    assert_eq!(
        DenomTrace::parse("transfer/channel-0/transfer/channel-12/uatom"),
        DenomTrace {
            path: "transfer/channel-0/transfer/channel-12".to_owned(),
            base_denom: "uatom".to_owned()
        }
    );
    // Base denominations may contain slashes.
    assert_eq!(
        DenomTrace::parse("transfer/channel-3/gamm/pool/1"),
        DenomTrace {
            path: "transfer/channel-3".to_owned(),
            base_denom: "gamm/pool/1".to_owned()
        }
    );
    // Without a valid channel identifier there is no path.
    assert_eq!(
        DenomTrace::parse("transfer/chan-0/uatom"),
        DenomTrace {
            path: String::new(),
            base_denom: "transfer/chan-0/uatom".to_owned()
        }
    );
    assert_eq!(DenomTrace::parse("transfer/channel-+1/uatom").path, "");
}

#[test]
fn native_denom_is_not_hashed() {
    assert_eq!(DenomTrace::parse("gamm/pool/1").ibc_denom(), "gamm/pool/1");
}

#[test]
fn sha256_hex() {
    let h = Sha256::new(br#"{"validators":[]}"#);
    assert_eq!(
        h.to_string(),
        "0257bf2a2d4ac5d48236f7c6fa5b57c3f95fac72b0f718c315ad1f52c75fc72e"
    );
    assert_eq!(h.to_hex_upper(), h.to_string().to_uppercase());
}

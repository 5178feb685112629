use super::*;
use crate::testonly::{fake_key_address, FakeChain, FakeNetwork, FakeRelayer, FAKE_GAS_WANTED};
use assert_matches::assert_matches;
use ibc_testnet_concurrency::testonly::init_test_logging;
use ibc_testnet_crypto::{bech32, denom::ibc_denom};
use ibc_testnet_orchestrator::{testonly::FakeRuntime, CosmosChain, OrchestratorConfig};
use ibc_testnet_roles::{Chain as _, ChainConfig};
use pretty_assertions::assert_eq;
use std::{sync::Arc, time::Duration};
use test_casing::test_casing;

fn gaia() -> ChainConfig {
    ChainConfig::heighliner("gaia", "gaiad", "cosmos", "uatom", "0.025uatom", 1.3, "330h")
}

fn osmosis() -> ChainConfig {
    ChainConfig::heighliner("osmosis", "osmosisd", "osmo", "uosmo", "0.0025uosmo", 1.3, "336h")
}

struct TestNet {
    net: FakeNetwork,
    src: FakeChain,
    dst: FakeChain,
}

impl TestNet {
    fn new() -> Self {
        init_test_logging();
        let net = FakeNetwork::new();
        Self {
            src: net.chain(gaia()),
            dst: net.chain(osmosis()),
            net,
        }
    }

    async fn run(
        &mut self,
        test_case: TestCase,
        relayer: &FakeRelayer,
    ) -> Result<(), ScenarioError> {
        let home = tempfile::tempdir().unwrap();
        ScenarioEngine::default()
            .run_test_case(
                test_case,
                "relay",
                home.path(),
                &mut self.src,
                &mut self.dst,
                relayer,
            )
            .await
    }

    /// Address of the user of `chain` on the chain with `prefix`.
    fn user(chain: &ChainConfig, prefix: &str) -> String {
        bech32::account_address(prefix, &fake_key_address(&chain.chain_id, USER_KEY)).unwrap()
    }
}

#[test]
fn relayed_delta() {
    // 1_000_000 sent with fees of 80_000 gas at 0.025 per gas unit.
    let fees = gaia().gas_fees(80_000).unwrap();
    assert_eq!(fees, 2_000);
    let delta = Delta::relayed(1_000_000, fees);
    assert_eq!(delta, Delta { src: -1_002_000, dst: 1_000_000 });
    delta
        .check(
            (1_000_000_000_000, 999_998_998_000),
            (0, 1_000_000),
        )
        .unwrap();
}

#[test]
fn delta_mismatch() {
    // Fees were not charged.
    assert_eq!(
        Delta::relayed(1_000_000, 2_000).check((10_000_000, 9_000_000), (0, 1_000_000)),
        Err(AssertionFailure {
            check: "source balance".to_owned(),
            expected: 8_998_000,
            actual: 9_000_000,
        }),
    );
    assert_eq!(
        Delta::timed_out(2_000).check((10_000_000, 9_998_000), (0, 1)),
        Err(AssertionFailure {
            check: "destination balance".to_owned(),
            expected: 0,
            actual: 1,
        }),
    );
    assert_eq!(
        Delta::interchain_account(1_000).check((5_000, 4_999), (7, 7)),
        Err(AssertionFailure {
            check: "source balance".to_owned(),
            expected: 4_000,
            actual: 4_999,
        }),
    );
}

#[test]
fn timeout_policies() {
    assert_eq!(TimeoutPolicy::Default.ibc_timeout(), None);
    assert_eq!(
        TimeoutPolicy::Disabled.ibc_timeout(),
        Some(ibc_testnet_roles::IbcTimeout::DISABLED)
    );
    let cfg = ScenarioConfig::default();
    let height = TimeoutPolicy::Height {
        blocks: cfg.height_timeout_blocks,
        wait_blocks: cfg.height_timeout_wait_blocks,
    };
    assert_eq!(height.ibc_timeout().unwrap().height, 10);
    let timestamp = TimeoutPolicy::Timestamp {
        timeout: cfg.timestamp_timeout(),
        sleep: cfg.timestamp_timeout_sleep(),
    };
    assert_eq!(timestamp.ibc_timeout().unwrap().nano_seconds, 10_000_000_000);
    assert!(height.expires() && timestamp.expires());
    assert!(!TimeoutPolicy::Disabled.expires());
}

#[test]
fn test_case_names() {
    for case in TestCase::ALL {
        assert_eq!(case.to_string().parse::<TestCase>().unwrap(), case);
    }
    assert_eq!(
        "RelayerInterchainAccountTest".parse::<TestCase>().unwrap(),
        TestCase::InterchainAccount
    );
    assert_eq!(
        "RelayPacketTestSomething".parse::<TestCase>(),
        Err(UnknownTestCase("RelayPacketTestSomething".to_owned()))
    );
}

#[test]
fn scenario_config_defaults() {
    let cfg: ScenarioConfig = serde_json::from_str(r#"{"transfer_amount": 5}"#).unwrap();
    assert_eq!(cfg.transfer_amount, 5);
    assert_eq!(cfg.relay_wait_blocks, 10);
    assert_eq!(cfg.bidirectional_relay_wait_blocks, 30);
    assert_eq!(cfg.timestamp_relay_wait_blocks, 20);
}

#[test_casing(5, TestCase::ALL)]
#[tokio::test(start_paused = true)]
async fn test_case_passes(test_case: TestCase) {
    let mut t = TestNet::new();
    let relayer = t.net.relayer();
    t.run(test_case, &relayer).await.unwrap();
    assert_eq!(t.net.pending_packets(), 0);
}

#[tokio::test(start_paused = true)]
async fn relayed_transfer_balances() {
    let mut t = TestNet::new();
    let relayer = t.net.relayer();
    t.run(TestCase::RelayPacketNoTimeout, &relayer).await.unwrap();

    let cfg = ScenarioConfig::default();
    let (src, dst) = (gaia(), osmosis());
    let fees = src.gas_fees(FAKE_GAS_WANTED).unwrap();
    assert_eq!(
        t.net.balance(&src.chain_id, &TestNet::user(&src, "cosmos"), "uatom"),
        cfg.user_funds - cfg.transfer_amount - fees
    );
    let voucher = ibc_denom("transfer", "channel-1", "uatom");
    assert_eq!(
        t.net.balance(&dst.chain_id, &TestNet::user(&src, "osmo"), &voucher),
        cfg.transfer_amount
    );
}

#[test_casing(2, [TestCase::RelayPacketHeightTimeout, TestCase::RelayPacketTimestampTimeout])]
#[tokio::test(start_paused = true)]
async fn timed_out_transfer_is_refunded(test_case: TestCase) {
    let mut t = TestNet::new();
    let relayer = t.net.relayer();
    t.run(test_case, &relayer).await.unwrap();

    let cfg = ScenarioConfig::default();
    let src = gaia();
    let fees = src.gas_fees(FAKE_GAS_WANTED).unwrap();
    assert_eq!(
        t.net.balance(&src.chain_id, &TestNet::user(&src, "cosmos"), "uatom"),
        cfg.user_funds - fees
    );
}

#[tokio::test(start_paused = true)]
async fn idle_relayer_fails_assertion() {
    let mut t = TestNet::new();
    let relayer = t.net.idle_relayer();
    let err = t.run(TestCase::RelayPacketNoTimeout, &relayer).await.unwrap_err();
    assert_matches!(err, ScenarioError::Assertion(failure) => {
        assert_eq!(failure, AssertionFailure {
            check: "destination balance".to_owned(),
            expected: ScenarioConfig::default().transfer_amount,
            actual: 0,
        });
    });
    assert_eq!(t.net.pending_packets(), 1);
}

#[tokio::test(start_paused = true)]
async fn idle_relayer_fails_bidirectional_transfer() {
    let mut t = TestNet::new();
    let relayer = t.net.idle_relayer();
    assert_matches!(
        t.run(TestCase::RelayPacket, &relayer).await,
        Err(ScenarioError::Assertion(AssertionFailure { check, .. }))
            if check == "destination balance"
    );
}

#[tokio::test(start_paused = true)]
async fn interchain_account_needs_relayer() {
    let mut t = TestNet::new();
    let relayer = t.net.idle_relayer();
    assert_matches!(
        t.run(TestCase::InterchainAccount, &relayer).await,
        Err(ScenarioError::Infrastructure(_))
    );
}

#[tokio::test(start_paused = true)]
async fn setup_failure() {
    let mut t = TestNet::new();
    let home = tempfile::tempdir().unwrap();
    t.src.initialize("relay", home.path()).await.unwrap();
    let relayer = t.net.relayer();
    assert_matches!(
        t.run(TestCase::RelayPacketNoTimeout, &relayer).await,
        Err(ScenarioError::Setup(_))
    );
}

#[tokio::test]
async fn failing_chain_does_not_cancel_counterparty_bootstrap() {
    init_test_logging();
    let cfg = OrchestratorConfig {
        liveness_poll_interval_ms: 1,
        liveness_timeout_secs: 10,
        ..OrchestratorConfig::default()
    };
    let src_runtime = Arc::new(FakeRuntime::new(gaia()).fail_create(0));
    let dst_runtime =
        Arc::new(FakeRuntime::new(osmosis()).slow_create(Duration::from_millis(200)));
    let mut src = CosmosChain::new(src_runtime.clone(), gaia(), cfg.clone(), 1, 1);
    let mut dst = CosmosChain::new(dst_runtime.clone(), osmosis(), cfg, 1, 1);

    let net = FakeNetwork::new();
    net.chain(gaia());
    net.chain(osmosis());
    let home = tempfile::tempdir().unwrap();
    let res = ScenarioEngine::default()
        .run_test_case(
            TestCase::RelayPacketNoTimeout,
            "relay",
            home.path(),
            &mut src,
            &mut dst,
            &net.relayer(),
        )
        .await;
    assert_matches!(res, Err(ScenarioError::Setup(_)));
    // The failing chain still created its other container.
    assert_eq!(src_runtime.created(), vec![1]);
    let mut created = dst_runtime.created();
    created.sort_unstable();
    assert_eq!(created, vec![0, 1]);
    assert_eq!(dst_runtime.started().len(), 2);
}

use super::*;
use crate::testonly::{fake_key_file, fake_node_id, FakeRuntime, FAKE_GAS_WANTED};
use assert_matches::assert_matches;
use ibc_testnet_concurrency::testonly::init_test_logging;
use ibc_testnet_genesis::GenesisError;
use ibc_testnet_roles::{Chain, ChainConfig, NodeRole, WalletAmount};
use pretty_assertions::assert_eq;
use std::{sync::Arc, time::Duration};
use test_casing::test_casing;

fn gaia() -> ChainConfig {
    ChainConfig::heighliner("gaia", "gaiad", "cosmos", "uatom", "0.025uatom", 1.3, "330h")
}

fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        liveness_poll_interval_ms: 1,
        liveness_timeout_secs: 10,
        ..OrchestratorConfig::default()
    }
}

fn setup(runtime: FakeRuntime) -> (Arc<FakeRuntime>, Orchestrator) {
    init_test_logging();
    let runtime = Arc::new(runtime);
    let orchestrator = Orchestrator::new(runtime.clone(), gaia(), test_config());
    (runtime, orchestrator)
}

async fn genesis_copies(nodes: &NodeSet) -> Vec<Vec<u8>> {
    let mut copies = vec![];
    for node in nodes.nodes() {
        copies.push(tokio::fs::read(node.genesis_path()).await.unwrap());
    }
    copies
}

#[test_casing(4, [(1, 0), (1, 2), (3, 0), (4, 1)])]
#[test]
fn node_set_layout(num_validators: usize, num_full_nodes: usize) {
    let home = tempfile::tempdir().unwrap();
    let nodes = NodeSet::new(home.path(), "gaia", "test", num_validators, num_full_nodes).unwrap();
    assert_eq!(nodes.len(), num_validators + num_full_nodes);
    for (i, node) in nodes.nodes().iter().enumerate() {
        assert_eq!(node.index, i);
        assert_eq!(node.role == NodeRole::Validator, i < num_validators);
        assert_eq!(node.name, format!("node-{i}-gaia-test"));
        assert_eq!(node.home, home.path().join(&node.name));
    }
    let want_relayer = if num_full_nodes > 0 { num_validators } else { 0 };
    assert_eq!(nodes.relayer_node().index, want_relayer);
    assert_eq!(nodes.validators().len(), num_validators);
    assert_eq!(nodes.full_nodes().len(), num_full_nodes);
}

#[test]
fn node_set_needs_a_validator() {
    let home = tempfile::tempdir().unwrap();
    assert_matches!(
        NodeSet::new(home.path(), "gaia", "test", 0, 2),
        Err(BootstrapError::Config(_))
    );
}

#[test]
fn node_paths() {
    let home = tempfile::tempdir().unwrap();
    let nodes = NodeSet::new(home.path(), "gaia", "test", 1, 0).unwrap();
    let node = &nodes.nodes()[0];
    let config = home.path().join("node-0-gaia-test").join("config");
    assert_eq!(node.genesis_path(), config.join("genesis.json"));
    assert_eq!(
        node.priv_validator_key_path(),
        config.join("priv_validator_key.json")
    );
    assert_eq!(node.gentx_path("abc"), config.join("gentx").join("gentx-abc.json"));
    assert_eq!(node.hostname(), "node-0-gaia-test");
}

#[test]
fn peer_lists() {
    let peers = Peers(
        (0..3)
            .map(|index| Peer {
                index,
                node_id: format!("id{index}"),
                host: format!("host{index}"),
                port: P2P_PORT,
            })
            .collect(),
    );
    assert_eq!(
        peers.to_string(),
        "id0@host0:26656,id1@host1:26656,id2@host2:26656"
    );
    assert_eq!(peers.excluding(1), "id0@host0:26656,id2@host2:26656");
    assert_eq!(peers.excluding(7), peers.to_string());
}

#[tokio::test]
async fn allocate_ignores_pull_failures() {
    let (runtime, orchestrator) = setup(FakeRuntime::new(gaia()).fail_pull());
    let home = tempfile::tempdir().unwrap();
    let nodes = orchestrator.allocate(home.path(), "test", 2, 1).await.unwrap();
    assert!(runtime.pulled().is_empty());
    for node in nodes.nodes() {
        assert!(node.home.is_dir());
    }
}

#[tokio::test]
async fn create_all_waits_for_every_node() {
    let (runtime, orchestrator) = setup(FakeRuntime::new(gaia()).fail_create(2));
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 3, 1).await.unwrap();
    let err = orchestrator.create_all(&mut nodes).await.unwrap_err();
    assert_matches!(
        err,
        BootstrapError::Infrastructure(ref err) if format!("{err:#}").contains("node-2-gaia-test")
    );
    // No rollback of the nodes which were created.
    assert_eq!(nodes.containers(), 3);
    assert_eq!(runtime.created().len(), 3);
    assert!(nodes.get(2).unwrap().container.is_none());
    // Peers cannot be computed for a partial node set.
    assert_matches!(
        orchestrator.compute_peers(&nodes).await,
        Err(BootstrapError::Infrastructure(_))
    );
}

#[tokio::test]
async fn bootstrap_from_scratch() {
    let (runtime, orchestrator) = setup(FakeRuntime::new(gaia()));
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 3, 1).await.unwrap();
    let wallet = WalletAmount {
        address: "cosmos1user".to_owned(),
        denom: "uatom".to_owned(),
        amount: 10_000_000_000,
    };
    orchestrator
        .bootstrap_from_scratch(&mut nodes, &[wallet.clone()])
        .await
        .unwrap();

    // Every node runs the genesis collected on the first validator.
    let copies = genesis_copies(&nodes).await;
    assert!(copies.iter().all(|c| c == &copies[0]));
    let genesis: serde_json::Value = serde_json::from_slice(&copies[0]).unwrap();
    let mut want_gentxs: Vec<String> = nodes
        .validators()
        .iter()
        .map(|n| format!("gentx-{}.json", fake_node_id(&n.name)))
        .collect();
    want_gentxs.sort();
    assert_eq!(genesis["gentxs"], serde_json::json!(want_gentxs));

    let accounts: Vec<String> = runtime
        .genesis_accounts(0)
        .into_iter()
        .map(|(address, _)| address)
        .collect();
    let mut want_accounts: Vec<String> = nodes
        .validators()
        .iter()
        .map(|n| runtime.address(n, VALIDATOR_KEY))
        .collect();
    want_accounts.push(wallet.address.clone());
    assert_eq!(accounts, want_accounts);
    let (_, coins) = runtime.genesis_accounts(0).pop().unwrap();
    assert_eq!(coins, [wallet.coin()]);

    let mut started = runtime.started();
    started.sort();
    assert_eq!(started, [0, 1, 2, 3]);
    let peers = runtime.peers(0).unwrap();
    assert_eq!(peers.split(',').count(), 3);
    assert!(!peers.contains(&fake_node_id(&nodes.nodes()[0].name)));
    assert!(peers.contains(&format!(
        "{}@node-3-gaia-test:26656",
        fake_node_id("node-3-gaia-test")
    )));
}

const ALPHA: &str = "A1B2C3D4E5F60718293A4B5C6D7E8F9011223344";
const BETA: &str = "0000000000000000000000000000000000000000";
const GAMMA: &str = "2222222222222222222222222222222222222222";

fn reference_genesis() -> Vec<u8> {
    format!(
        r#"{{
  "chain_id": "gaia",
  "validators": [
    {{"address": "{GAMMA}", "power": "20", "pub_key": {{"type": "tendermint/PubKeyEd25519", "value": "Z2FtbWE="}}}},
    {{"address": "{ALPHA}", "power": "50", "pub_key": {{"type": "tendermint/PubKeyEd25519", "value": "YWxwaGE="}}}},
    {{"address": "{BETA}",  "power": "30", "pub_key": {{"type": "tendermint/PubKeyEd25519", "value": "YmV0YQ=="}}}}
  ]
}}"#
    )
    .into_bytes()
}

#[tokio::test]
async fn bootstrap_from_genesis() {
    let (runtime, orchestrator) = setup(FakeRuntime::new(gaia()));
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 2, 1).await.unwrap();
    orchestrator
        .bootstrap_from_genesis(&mut nodes, reference_genesis())
        .await
        .unwrap();

    let copies = genesis_copies(&nodes).await;
    assert!(copies.iter().all(|c| c == &copies[0]));
    let genesis = String::from_utf8(copies[0].clone()).unwrap();
    let key0 = fake_key_file(&nodes.nodes()[0].name);
    let key1 = fake_key_file(&nodes.nodes()[1].name);
    let full_node_key = fake_key_file(&nodes.nodes()[2].name);
    // The strongest validator goes to the first node.
    let want = String::from_utf8(reference_genesis())
        .unwrap()
        .replace(ALPHA, &key0.address)
        .replace("YWxwaGE=", &key0.pub_key.value)
        .replace(BETA, &key1.address)
        .replace("YmV0YQ==", &key1.pub_key.value);
    assert_eq!(genesis, want);
    assert!(!genesis.contains(&full_node_key.address));
    assert_eq!(runtime.started(), [0, 1, 2]);
}

#[tokio::test]
async fn bootstrap_from_genesis_with_too_few_validators() {
    let (runtime, orchestrator) = setup(FakeRuntime::new(gaia()));
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 1, 1).await.unwrap();
    let err = orchestrator
        .bootstrap_from_genesis(&mut nodes, reference_genesis())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        BootstrapError::ConsensusBootstrap(GenesisError::Quorum {
            required: 2,
            available: 1
        })
    );
    assert!(runtime.created().is_empty());
}

#[tokio::test]
async fn bootstrap_from_malformed_genesis() {
    let (_, orchestrator) = setup(FakeRuntime::new(gaia()));
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 1, 0).await.unwrap();
    let reference = br#"{"validators": [{"address": "AB", "power": "lots", "pub_key": {"type": "t", "value": "v"}}]}"#;
    assert_matches!(
        orchestrator
            .bootstrap_from_genesis(&mut nodes, reference.to_vec())
            .await,
        Err(BootstrapError::Config(_))
    );
}

#[tokio::test]
async fn liveness_timeout() {
    let (runtime, _) = setup(FakeRuntime::new(gaia()));
    let orchestrator = Orchestrator::new(
        runtime.clone(),
        gaia(),
        OrchestratorConfig {
            liveness_poll_interval_ms: 1,
            liveness_timeout_secs: 0,
            ..OrchestratorConfig::default()
        },
    );
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 1, 0).await.unwrap();
    orchestrator.create_all(&mut nodes).await.unwrap();
    let peers = orchestrator.compute_peers(&nodes).await.unwrap();
    orchestrator
        .inject_peers_and_start(&nodes, &peers, StartOrder::Sequential)
        .await
        .unwrap();
    runtime.stall();
    let err = orchestrator.wait_liveness(&nodes, 3).await.unwrap_err();
    assert_matches!(
        err,
        BootstrapError::LivenessTimeout {
            blocks: 3,
            observed: 0,
            timeout,
            ..
        } if timeout == Duration::ZERO
    );
}

#[tokio::test]
async fn liveness_survives_failing_height_queries() {
    let (runtime, orchestrator) = setup(FakeRuntime::new(gaia()));
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 1, 0).await.unwrap();
    orchestrator.create_all(&mut nodes).await.unwrap();
    let peers = orchestrator.compute_peers(&nodes).await.unwrap();
    orchestrator
        .inject_peers_and_start(&nodes, &peers, StartOrder::Sequential)
        .await
        .unwrap();

    // The baseline is the height when the wait starts.
    let baseline = runtime.height(nodes.relayer_node()).await.unwrap();
    let height = orchestrator.wait_liveness(&nodes, 3).await.unwrap();
    assert_eq!(height, baseline + 4);

    // Without an answer to the first query, the first reported height is the baseline.
    // Blocks are produced on every query, failed ones included.
    runtime.fail_height_queries(2);
    let height = orchestrator.wait_liveness(&nodes, 3).await.unwrap();
    assert_eq!(height, baseline + 4 + 6);
}

#[tokio::test]
async fn zero_poll_interval_is_usable() {
    let (runtime, _) = setup(FakeRuntime::new(gaia()));
    let orchestrator = Orchestrator::new(
        runtime.clone(),
        gaia(),
        serde_json::from_str(r#"{"liveness_poll_interval_ms": 0}"#).unwrap(),
    );
    let home = tempfile::tempdir().unwrap();
    let mut nodes = orchestrator.allocate(home.path(), "test", 1, 0).await.unwrap();
    orchestrator.bootstrap_from_scratch(&mut nodes, &[]).await.unwrap();
    assert_eq!(runtime.started(), vec![0]);
}

#[tokio::test]
async fn liveness_before_start_times_out() {
    let (_, orchestrator) = setup(FakeRuntime::new(gaia()));
    let orchestrator = Orchestrator::new(
        orchestrator.runtime().clone(),
        gaia(),
        OrchestratorConfig {
            liveness_poll_interval_ms: 1,
            liveness_timeout_secs: 0,
            ..OrchestratorConfig::default()
        },
    );
    let home = tempfile::tempdir().unwrap();
    let nodes = orchestrator.allocate(home.path(), "test", 1, 0).await.unwrap();
    let err = orchestrator.wait_liveness(&nodes, 1).await.unwrap_err();
    assert_matches!(
        err,
        BootstrapError::LivenessTimeout { ref source, .. }
            if source.last_error.as_deref().unwrap().contains("connection refused")
    );
}

#[tokio::test]
async fn cosmos_chain() {
    init_test_logging();
    let runtime = Arc::new(FakeRuntime::new(gaia()));
    let mut chain = CosmosChain::new(runtime.clone(), gaia(), test_config(), 2, 1);
    let home = tempfile::tempdir().unwrap();
    assert!(chain.height().await.is_err());
    chain.initialize("test", home.path()).await.unwrap();
    assert!(chain.initialize("test", home.path()).await.is_err());
    chain.start("test", &[]).await.unwrap();

    assert_eq!(chain.rpc_address(), "http://node-2-gaia-test:26657");
    assert_eq!(chain.grpc_address(), "node-2-gaia-test:9090");
    assert_eq!(chain.host_rpc_address(), "http://127.0.0.1:30021");
    assert_eq!(chain.host_grpc_address(), "127.0.0.1:30022");

    chain.create_key("user").await.unwrap();
    let relayer = chain.nodes().unwrap().relayer_node().clone();
    assert!(runtime.has_key(&relayer, "user"));
    let user = runtime.address(&relayer, "user");
    runtime.set_balance(&user, "uatom", 1_000_000_000);

    let amount = WalletAmount {
        address: "osmo1receiver".to_owned(),
        denom: "uatom".to_owned(),
        amount: 1_000_000,
    };
    let tx_hash = chain
        .send_ibc_transfer("channel-0", "user", &amount, None)
        .await
        .unwrap();
    let tx = chain.get_transaction(&tx_hash).await.unwrap();
    assert_eq!(tx.gas_wanted, FAKE_GAS_WANTED);
    let fees = chain.gas_fees_in_native_denom(tx.gas_wanted).unwrap();
    assert_eq!(fees, 2_000);
    assert_eq!(
        chain.get_balance(&user, "uatom").await.unwrap(),
        1_000_000_000 - 1_000_000 - fees
    );

    let before = chain.height().await.unwrap();
    let after = chain.wait_for_blocks(3).await.unwrap();
    assert!(after >= before + 3);
}

use std::time::{Duration, Instant};

use evm_workspaces::error::RpcErrorCode;
use evm_workspaces::network::NetworkInfo;
use evm_workspaces::ErrorKind;
use evm_workspaces_stub::{self as stub, Behavior, StubNode};
use test_log::test;

#[test(tokio::test)]
async fn test_custom_network() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior::default()).await?;
    let worker = evm_workspaces::custom(node.rpc_addr())
        .api_key("secret")
        .await?;

    assert_eq!(worker.info().name, "custom");
    assert_eq!(worker.chain_id(), stub::CHAIN_ID);
    assert_eq!(worker.signers().await?.len(), stub::ACCOUNTS.len());

    let methods = node.methods();
    assert_eq!(methods[0], "web3_clientVersion");
    assert!(methods.iter().any(|m| m == "eth_chainId"));
    Ok(())
}

#[test(tokio::test)]
async fn test_unreachable_node() -> anyhow::Result<()> {
    // Bind then release a port so nothing is listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let rpc_addr = format!("http://{}", listener.local_addr()?);
    drop(listener);

    let started = Instant::now();
    let err = evm_workspaces::custom(&rpc_addr)
        .rpc_timeout(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(*err.kind(), ErrorKind::Rpc(RpcErrorCode::ConnectionFailure));
    assert!(err.to_string().contains("did not become reachable"));

    // Each attempt gives up quickly, so the whole wait stays near the timeout.
    assert!(started.elapsed() < Duration::from_secs(3));
    Ok(())
}

#[test(tokio::test)]
async fn test_invalid_rpc_addr() {
    let err = evm_workspaces::custom("not a url").await.unwrap_err();
    assert_eq!(*err.kind(), ErrorKind::DataConversion);
}

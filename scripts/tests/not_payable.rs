use evm_workspaces::error::RpcErrorCode;
use evm_workspaces::ErrorKind;
use evm_workspaces_scripts::{execute, run, RunnerConfig, Verdict};
use evm_workspaces_stub::{self as stub, Behavior, StubNode};
use serde_json::json;
use tempfile::TempDir;
use test_log::test;

/// Artifacts holding a `Payable` contract with the given ABI.
fn artifacts(abi: serde_json::Value) -> anyhow::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    stub::write_artifact(dir.path(), "Payable", abi)?;
    Ok(dir)
}

/// `Payable` as some broken compiler output would describe it, with
/// `notPayable` accepting value.
fn mislabeled_abi() -> serde_json::Value {
    json!([stub::function_abi("notPayable", "payable")])
}

fn config(node: &StubNode, artifacts: &TempDir) -> RunnerConfig {
    RunnerConfig {
        rpc_url: node.rpc_addr().into(),
        artifacts_dir: artifacts.path().into(),
        ..Default::default()
    }
}

/// Whether a call into a deployed contract ever reached the node.
fn call_reached_node(node: &StubNode) -> bool {
    ["eth_estimateGas", "eth_sendTransaction"]
        .iter()
        .flat_map(|method| node.params_of(method))
        .any(|params| !params[0]["to"].is_null())
}

#[test(tokio::test)]
async fn test_value_rejected() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior::default()).await?;
    let artifacts = artifacts(stub::payable_abi())?;
    let config = config(&node, &artifacts);

    let worker = config.connect().await?;
    let outcome = run(&worker, &config.artifacts(), &config).await?;
    assert!(matches!(outcome.verdict, Verdict::Passed));
    assert!(!worker.code_at(outcome.contract).await?.is_empty());
    assert!(!call_reached_node(&node));

    assert_eq!(execute(&config).await, 0);
    Ok(())
}

#[test(tokio::test)]
async fn test_value_rejected_by_node() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior {
        call_error: Some("VM Exception: non-payable method cannot override value".into()),
        ..Default::default()
    })
    .await?;
    let artifacts = artifacts(stub::payable_abi())?;
    let config = RunnerConfig {
        skip_abi_checks: true,
        ..config(&node, &artifacts)
    };

    let worker = config.connect().await?;
    let outcome = run(&worker, &config.artifacts(), &config).await?;
    assert!(matches!(outcome.verdict, Verdict::Passed));
    assert!(call_reached_node(&node));

    assert_eq!(execute(&config).await, 0);
    Ok(())
}

#[test(tokio::test)]
async fn test_other_call_error() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior {
        call_error: Some(stub::HARDHAT_NON_PAYABLE_MSG.into()),
        ..Default::default()
    })
    .await?;
    let artifacts = artifacts(mislabeled_abi())?;
    let config = config(&node, &artifacts);

    let worker = config.connect().await?;
    let outcome = run(&worker, &config.artifacts(), &config).await?;
    match outcome.verdict {
        Verdict::Failed(err) => {
            assert_eq!(*err.kind(), ErrorKind::Rpc(RpcErrorCode::EstimateGasFailure));
            assert!(err.to_string().contains("non-payable function was called"));
        }
        verdict => anyhow::bail!("unexpected verdict {verdict:?}"),
    }

    assert_eq!(execute(&config).await, 1);
    Ok(())
}

#[test(tokio::test)]
async fn test_deploy_failure() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior {
        deploy_error: Some("sender doesn't have enough funds to send tx".into()),
        ..Default::default()
    })
    .await?;
    let artifacts = artifacts(stub::payable_abi())?;
    let config = config(&node, &artifacts);

    let worker = config.connect().await?;
    let err = run(&worker, &config.artifacts(), &config).await.unwrap_err();
    assert_eq!(*err.kind(), ErrorKind::Rpc(RpcErrorCode::EstimateGasFailure));

    assert_eq!(execute(&config).await, 1);
    assert!(!call_reached_node(&node));
    Ok(())
}

#[test(tokio::test)]
async fn test_reverted_deploy() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior {
        revert: true,
        ..Default::default()
    })
    .await?;
    let artifacts = artifacts(stub::payable_abi())?;
    let config = config(&node, &artifacts);

    assert_eq!(execute(&config).await, 1);
    assert!(!call_reached_node(&node));
    Ok(())
}

#[test(tokio::test)]
async fn test_setup_failures() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior::default()).await?;
    let empty = tempfile::tempdir()?;
    assert_eq!(execute(&config(&node, &empty)).await, 1);

    let node = StubNode::spawn(Behavior {
        no_accounts: true,
        ..Default::default()
    })
    .await?;
    let artifacts = artifacts(stub::payable_abi())?;
    assert_eq!(execute(&config(&node, &artifacts)).await, 1);
    assert!(node.params_of("eth_sendTransaction").is_empty());
    Ok(())
}

#[test(tokio::test)]
async fn test_call_not_rejected() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior::default()).await?;
    let artifacts = artifacts(mislabeled_abi())?;
    let config = config(&node, &artifacts);

    let worker = config.connect().await?;
    let outcome = run(&worker, &config.artifacts(), &config).await?;
    match &outcome.verdict {
        Verdict::NotRejected(details) => assert!(details.is_success()),
        verdict => anyhow::bail!("unexpected verdict {verdict:?}"),
    }
    assert_eq!(outcome.verdict.exit_code(), 0);

    assert_eq!(execute(&config).await, 0);
    Ok(())
}

#[test(tokio::test)]
async fn test_runs_are_independent() -> anyhow::Result<()> {
    let node = StubNode::spawn(Behavior::default()).await?;
    let artifacts = artifacts(stub::payable_abi())?;
    let config = config(&node, &artifacts);

    let worker = config.connect().await?;
    let first = run(&worker, &config.artifacts(), &config).await?;
    let second = run(&worker, &config.artifacts(), &config).await?;

    assert_ne!(first.contract, second.contract);
    assert!(matches!(first.verdict, Verdict::Passed));
    assert!(matches!(second.verdict, Verdict::Passed));
    Ok(())
}

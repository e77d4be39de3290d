//! Stub development node for integration tests. It speaks just enough of the
//! `eth_` JSON-RPC namespace to deploy contracts and call into them, and can be
//! told to fail in the ways a real node does.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const CHAIN_ID: u64 = 31337;
pub const ACCOUNTS: [&str; 2] = [
    "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
    "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
];
/// Message a hardhat node gives when a non-payable function receives value.
pub const HARDHAT_NON_PAYABLE_MSG: &str =
    "Error: Transaction reverted: non-payable function was called with value 1000000000000000000";

/// How the stub node misbehaves. Defaults to a healthy node.
#[derive(Clone, Debug, Default)]
pub struct Behavior {
    /// Error message returned when estimating or sending a contract creation.
    pub deploy_error: Option<String>,
    /// Error message returned when estimating or sending a call to a contract.
    pub call_error: Option<String>,
    /// Mine every transaction with a reverted status.
    pub revert: bool,
    /// Report no managed accounts.
    pub no_accounts: bool,
    /// Answer `eth_sendTransaction` with `503 Service Unavailable`, after the
    /// request has been recorded.
    pub send_unavailable: bool,
}

#[derive(Default)]
struct NodeState {
    behavior: Behavior,
    tx_count: u64,
    receipts: HashMap<String, Value>,
    /// Receipt lookups answered with `null` so far, per transaction.
    pending_polls: HashMap<String, u32>,
    code: HashMap<String, String>,
    requests: Vec<(String, Value)>,
}

/// Handle for the stub node server. The server stops once this is dropped.
pub struct StubNode {
    rpc_addr: String,
    join: JoinHandle<()>,
    state: Arc<Mutex<NodeState>>,
}

impl StubNode {
    pub async fn spawn(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(Mutex::new(NodeState {
            behavior,
            ..Default::default()
        }));
        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let rpc_addr = format!("http://{}", listener.local_addr()?);
        let join = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            rpc_addr,
            join,
            state,
        })
    }

    pub fn rpc_addr(&self) -> &str {
        &self.rpc_addr
    }

    /// Methods of every request received so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.requests.iter().map(|(method, _)| method.clone()).collect())
            .unwrap_or_default()
    }

    /// Params of every `method` request received so far, in order.
    pub fn params_of(&self, method: &str) -> Vec<Value> {
        self.state
            .lock()
            .map(|state| {
                state
                    .requests
                    .iter()
                    .filter(|(m, _)| m == method)
                    .map(|(_, params)| params.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for StubNode {
    fn drop(&mut self) {
        self.join.abort();
    }
}

async fn handle_rpc(
    State(state): State<Arc<Mutex<NodeState>>>,
    Json(request): Json<Value>,
) -> Response {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request.get("params").cloned().unwrap_or_else(|| json!([]));

    let outcome = match state.lock() {
        Ok(mut state) => {
            state.requests.push((method.clone(), params.clone()));
            if method == "eth_sendTransaction" && state.behavior.send_unavailable {
                return (StatusCode::SERVICE_UNAVAILABLE, "node overloaded").into_response();
            }
            dispatch(&mut state, &method, &params)
        }
        Err(_) => Err("stub node state poisoned".to_string()),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32603, "message": message },
        }),
    })
    .into_response()
}

fn dispatch(state: &mut NodeState, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "web3_clientVersion" => Ok(json!("StubNode/v0.1.0")),
        "eth_chainId" => Ok(json!(format!("0x{CHAIN_ID:x}"))),
        "eth_accounts" if state.behavior.no_accounts => Ok(json!([])),
        "eth_accounts" => Ok(json!(ACCOUNTS)),
        "eth_estimateGas" => {
            check_tx(state, &params[0])?;
            Ok(json!("0x5208"))
        }
        "eth_sendTransaction" => {
            let tx = &params[0];
            check_tx(state, tx)?;
            Ok(json!(mine(state, tx)))
        }
        "eth_getTransactionReceipt" => {
            let hash = params[0].as_str().unwrap_or_default().to_string();
            let polls = state.pending_polls.entry(hash.clone()).or_insert(0);
            // Every transaction looks pending on the first lookup.
            if *polls == 0 {
                *polls += 1;
                return Ok(Value::Null);
            }
            Ok(state.receipts.get(&hash).cloned().unwrap_or(Value::Null))
        }
        "eth_getCode" => {
            let address = params[0].as_str().unwrap_or_default().to_lowercase();
            Ok(json!(state.code.get(&address).cloned().unwrap_or_else(|| "0x".into())))
        }
        "eth_call" => Ok(json!(format!("0x{}", "00".repeat(31) + "2a"))),
        _ => Err(format!("Method {method} is not supported")),
    }
}

fn is_creation(tx: &Value) -> bool {
    tx.get("to").map_or(true, Value::is_null)
}

fn check_tx(state: &NodeState, tx: &Value) -> Result<(), String> {
    let error = if is_creation(tx) {
        &state.behavior.deploy_error
    } else {
        &state.behavior.call_error
    };
    match error {
        Some(message) => Err(message.clone()),
        None => Ok(()),
    }
}

fn mine(state: &mut NodeState, tx: &Value) -> String {
    state.tx_count += 1;
    let n = state.tx_count;
    let hash = format!("0x{n:064x}");
    let success = !state.behavior.revert;
    let status = if success { "0x1" } else { "0x0" };

    let contract_address = is_creation(tx).then(|| format!("0x{:040x}", 0x1000 + n));
    if let (Some(address), true) = (&contract_address, success) {
        state.code.insert(address.clone(), "0x6080604052".into());
    }

    state.receipts.insert(
        hash.clone(),
        json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": hash,
            "transactionIndex": "0x0",
            "blockNumber": format!("0x{n:x}"),
            "blockHash": format!("0x{:064x}", 0xb10c + n),
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": tx["from"],
            "to": tx.get("to").cloned().unwrap_or(Value::Null),
            "contractAddress": contract_address,
        }),
    );
    hash
}

/// ABI entry of a function taking no arguments.
pub fn function_abi(name: &str, mutability: &str) -> Value {
    json!({
        "inputs": [],
        "name": name,
        "outputs": [],
        "stateMutability": mutability,
        "type": "function",
    })
}

/// ABI of the `Payable` contract: `notPayable()` rejects value, `pay()` accepts it.
pub fn payable_abi() -> Value {
    json!([
        function_abi("notPayable", "nonpayable"),
        function_abi("pay", "payable"),
    ])
}

/// Write a hardhat artifact for `name` under `root`, laid out the way hardhat
/// compiles `contracts/<name>.sol`.
pub fn write_artifact(root: &Path, name: &str, abi: Value) -> anyhow::Result<()> {
    let source_name = format!("contracts/{name}.sol");
    let dir = root.join(&source_name);
    std::fs::create_dir_all(&dir)?;

    let artifact = json!({
        "_format": "hh-sol-artifact-1",
        "contractName": name,
        "sourceName": source_name,
        "abi": abi,
        "bytecode": "0x6080604052348015600f57600080fd5b50603f80601d6000396000f3fe6080604052",
        "deployedBytecode": "0x6080604052",
        "linkReferences": {},
        "deployedLinkReferences": {},
    });
    std::fs::write(
        dir.join(format!("{name}.json")),
        serde_json::to_string_pretty(&artifact)?,
    )?;
    Ok(())
}

use std::fmt;
use std::future::Future;
use std::time::Duration;

use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_transport::{RpcError, TransportError};
use alloy_transport_http::Http;
use reqwest::header::{HeaderMap, HeaderValue};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::debug;
use url::Url;

use crate::error::{Error, ErrorKind, RpcErrorCode};
use crate::result::Result;
use crate::types::{Address, Bytes, Gas, TxHash};

/// Interval between two receipt lookups while waiting for a transaction to be mined.
pub(crate) const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interval between two attempts at reaching the node while connecting.
const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connection timeout used when neither the builder nor `EVM_RPC_TIMEOUT_SECS` set one.
const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Header used to pass the API key to RPC providers that require one.
const API_KEY_HEADER: &str = "x-api-key";

/// A client that wraps around the JSON-RPC endpoint of an EVM node. Queries
/// that failed to reach the node are retried, transactions never are.
pub struct Client {
    provider: RootProvider,
    rpc_addr: Url,
}

/// Only failures to reach the node are worth retrying. An error object from
/// the node is deterministic and returned as-is.
fn is_transport_error(err: &TransportError) -> bool {
    matches!(err, RpcError::Transport(_))
}

/// Map a failed request into a workspaces [`Error`], categorizing error
/// responses from the node under `code`.
fn into_error(err: TransportError, code: RpcErrorCode) -> Error {
    match err {
        RpcError::Transport(_) => RpcErrorCode::ConnectionFailure.custom(err),
        RpcError::NullResp | RpcError::DeserError { .. } => {
            RpcErrorCode::QueryReturnedInvalidData.custom(err)
        }
        _ => code.custom(err),
    }
}

impl Client {
    pub(crate) fn new(rpc_addr: &str, api_key: Option<String>) -> Result<Self> {
        let rpc_addr = Url::parse(rpc_addr).map_err(|e| {
            ErrorKind::DataConversion.full(format!("invalid rpc address `{rpc_addr}`"), e)
        })?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = api_key {
            let value = HeaderValue::from_str(&api_key)
                .map_err(|e| ErrorKind::DataConversion.full("invalid api key", e))?;
            headers.insert(API_KEY_HEADER, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RpcErrorCode::ConnectionFailure.custom(e))?;

        let transport = Http::with_client(http, rpc_addr.clone());
        let is_local = transport.guess_local();
        let provider = RootProvider::new(RpcClient::new(transport, is_local));

        Ok(Self { provider, rpc_addr })
    }

    pub(crate) fn rpc_addr(&self) -> &Url {
        &self.rpc_addr
    }

    /// Perform a read-only request, retrying it when the node could not be reached.
    async fn query<R, F, T>(&self, method: &str, code: RpcErrorCode, task: F) -> Result<R>
    where
        F: FnMut() -> T,
        T: Future<Output = Result<R, TransportError>>,
    {
        let result = retry(task, is_transport_error).await;
        match &result {
            Ok(_) => debug!(target: "workspaces", "rpc {method} succeeded"),
            Err(err) => debug!(target: "workspaces", "rpc {method} failed: {err}"),
        }
        result.map_err(|err| into_error(err, code))
    }

    pub(crate) async fn chain_id(&self) -> Result<u64> {
        self.query("eth_chainId", RpcErrorCode::QueryFailure, || {
            self.provider.get_chain_id()
        })
        .await
    }

    pub(crate) async fn client_version(&self) -> Result<String> {
        self.provider
            .get_client_version()
            .await
            .map_err(|err| into_error(err, RpcErrorCode::QueryFailure))
    }

    /// Accounts managed and unlocked by the node itself.
    pub(crate) async fn accounts(&self) -> Result<Vec<Address>> {
        self.query("eth_accounts", RpcErrorCode::QueryFailure, || {
            self.provider.get_accounts()
        })
        .await
    }

    pub(crate) async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<Gas> {
        self.query("eth_estimateGas", RpcErrorCode::EstimateGasFailure, || {
            let tx = tx.clone();
            async move { self.provider.estimate_gas(tx).await }
        })
        .await
    }

    /// Submit `tx` for the node to sign and broadcast. The node picks the nonce,
    /// so a submission whose response got lost cannot be told apart from one
    /// that never arrived: it is sent exactly once.
    pub(crate) async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|err| into_error(err, RpcErrorCode::BroadcastTxFailure))?;
        debug!(target: "workspaces", "rpc eth_sendTransaction succeeded");
        Ok(*pending.tx_hash())
    }

    pub(crate) async fn transaction_receipt(
        &self,
        tx_hash: &TxHash,
    ) -> Result<Option<TransactionReceipt>> {
        self.query("eth_getTransactionReceipt", RpcErrorCode::QueryFailure, || {
            self.provider.get_transaction_receipt(*tx_hash)
        })
        .await
    }

    /// Poll for the receipt of `tx_hash` until the transaction has been mined. No
    /// upper bound is placed on the wait.
    pub(crate) async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<TransactionReceipt> {
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }

    pub(crate) async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.query("eth_call", RpcErrorCode::QueryFailure, || {
            let tx = tx.clone();
            async move { self.provider.call(tx).await }
        })
        .await
    }

    pub(crate) async fn code_at(&self, address: &Address) -> Result<Bytes> {
        self.query("eth_getCode", RpcErrorCode::QueryFailure, || async move {
            self.provider.get_code_at(*address).await
        })
        .await
    }

    /// Wait for the node behind `rpc_addr` to start answering requests, giving up
    /// after `timeout`. Without one, `EVM_RPC_TIMEOUT_SECS` (10 seconds by
    /// default) bounds the wait.
    pub(crate) async fn wait_for_rpc(&self, timeout: Option<Duration>) -> Result<()> {
        let timeout = match timeout {
            Some(timeout) => timeout,
            None => rpc_timeout_from_env()?,
        };

        let mut last_error = None;
        let connect = async {
            loop {
                match self.client_version().await {
                    Ok(version) => return version,
                    Err(err) => last_error = Some(err),
                }
                tokio::time::sleep(CONNECT_POLL_INTERVAL).await;
            }
        };
        let outcome = tokio::time::timeout(timeout, connect).await;

        match outcome {
            Ok(version) => {
                debug!(target: "workspaces", "connected to {} ({version})", self.rpc_addr);
                Ok(())
            }
            Err(_) => {
                let reason = last_error
                    .map(|err| err.to_string())
                    .unwrap_or_else(|| "no response".into());
                Err(RpcErrorCode::ConnectionFailure.message(format!(
                    "node at {} did not become reachable within {timeout:?}: {reason}",
                    self.rpc_addr
                )))
            }
        }
    }
}

fn rpc_timeout_from_env() -> Result<Duration> {
    match std::env::var("EVM_RPC_TIMEOUT_SECS") {
        Ok(secs) => secs
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|err| ErrorKind::DataConversion.full("invalid EVM_RPC_TIMEOUT_SECS", err)),
        Err(_) => Ok(DEFAULT_RPC_TIMEOUT),
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("rpc_addr", &self.rpc_addr.as_str())
            .finish()
    }
}

pub(crate) async fn retry<R, E, T, F, C>(task: F, condition: C) -> Result<R, E>
where
    F: FnMut() -> T,
    T: Future<Output = Result<R, E>>,
    C: FnMut(&E) -> bool,
{
    // Exponential backoff from 10ms up to 160ms, for a maximum of 5 retries:
    let retry_strategy = ExponentialBackoff::from_millis(2)
        .factor(5)
        .map(jitter)
        .take(5);

    RetryIf::start(retry_strategy, task, condition).await
}

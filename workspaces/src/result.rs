//! Result and execution types from results of RPC calls to the network.

use std::fmt;

use crate::error::ErrorKind;
use crate::types::{Address, BlockHeight, Bytes, Gas, TransactionReceipt, TxHash};

pub type Result<T, E = crate::error::Error> = core::result::Result<T, E>;

/// Execution related info as a result of performing a transaction, along with
/// a value of type `T` produced by it (such as the [`Contract`] handle of a
/// deployment).
///
/// [`Contract`]: crate::Contract
#[derive(Debug)]
#[non_exhaustive]
pub struct Execution<T> {
    pub result: T,
    pub details: ExecutionFinalResult,
}

impl<T> Execution<T> {
    pub fn unwrap(self) -> T {
        self.into_result().unwrap()
    }

    /// Convert into a [`Result`], where the value is only returned if the
    /// transaction did not revert.
    #[allow(clippy::result_large_err)]
    pub fn into_result(self) -> Result<T> {
        let result = self.result;
        self.details.into_result().map(|_| result)
    }

    /// Checks whether the transaction was successful.
    pub fn is_success(&self) -> bool {
        self.details.is_success()
    }

    /// Checks whether the transaction has failed.
    pub fn is_failure(&self) -> bool {
        self.details.is_failure()
    }
}

/// The result after evaluating a transaction, as reported by its receipt once
/// it has been mined.
#[derive(Clone)]
#[must_use]
pub struct ExecutionFinalResult {
    receipt: TransactionReceipt,
}

impl ExecutionFinalResult {
    pub(crate) fn from_receipt(receipt: TransactionReceipt) -> Self {
        Self { receipt }
    }

    /// Hash of the transaction this result belongs to.
    pub fn transaction_hash(&self) -> &TxHash {
        &self.receipt.transaction_hash
    }

    /// Total gas used by the transaction.
    pub fn gas_used(&self) -> Gas {
        self.receipt.gas_used
    }

    /// Height of the block the transaction was included in.
    pub fn block_number(&self) -> Option<BlockHeight> {
        self.receipt.block_number
    }

    /// Address of the contract created by this transaction, if it was a deployment.
    pub fn contract_address(&self) -> Option<&Address> {
        self.receipt.contract_address.as_ref()
    }

    /// The raw receipt returned by the node.
    pub fn receipt(&self) -> &TransactionReceipt {
        &self.receipt
    }

    /// Checks whether the transaction was successful. Returns true if the
    /// receipt does not report a reverted status.
    pub fn is_success(&self) -> bool {
        self.receipt.status()
    }

    /// Checks whether the transaction has failed, i.e. it was mined but reverted.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Converts this object into a [`Result`] holding the final result when the
    /// transaction succeeded, or an [`ErrorKind::Execution`] error carrying the
    /// result when it reverted.
    #[allow(clippy::result_large_err)]
    pub fn into_result(self) -> Result<ExecutionFinalResult> {
        if self.is_success() {
            return Ok(self);
        }

        let msg = format!("transaction {} reverted", self.receipt.transaction_hash);
        Err(ErrorKind::Execution.detailed(self, msg))
    }
}

impl fmt::Debug for ExecutionFinalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionFinalResult")
            .field("transaction_hash", &self.receipt.transaction_hash)
            .field("success", &self.is_success())
            .field("gas_used", &self.gas_used())
            .field("block_number", &self.block_number())
            .finish()
    }
}

/// The result from a call into a function through `eth_call`. Nothing is
/// committed to the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ViewResultDetails {
    /// ABI encoded return data of the function.
    pub result: Bytes,
}

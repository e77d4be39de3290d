//! All operation types that are generated/used when deploying contracts or
//! calling into them.

use std::sync::Arc;

use alloy_dyn_abi::JsonAbiExt;
use alloy_primitives::TxKind;
use alloy_rpc_types_eth::TransactionInput;
use tracing::{debug, info};

use crate::error::{ErrorKind, RpcErrorCode, NON_PAYABLE_VALUE_MSG};
use crate::network::ContractFactory;
use crate::result::{Execution, ExecutionFinalResult, Result, ViewResultDetails};
use crate::rpc::client::Client;
use crate::types::{
    is_payable, Bytes, DynSolValue, Function, Gas, StateMutability, TransactionRequest, U256,
};
use crate::Contract;

/// Reject a nonzero `value` sent to something whose mutability does not
/// accept one. This mirrors the check the node would perform on execution,
/// but fails before anything is sent.
fn check_value(name: &str, mutability: StateMutability, value: U256) -> Result<()> {
    if value.is_zero() || is_payable(mutability) {
        return Ok(());
    }

    Err(ErrorKind::NonPayableValue.message(format!(
        "{NON_PAYABLE_VALUE_MSG} (method={name}, value={value})"
    )))
}

/// Estimate gas for `tx` unless it was set explicitly, then send it and wait
/// for it to be mined.
async fn send_and_confirm(
    client: &Client,
    mut tx: TransactionRequest,
    gas: Option<Gas>,
) -> Result<ExecutionFinalResult> {
    let gas = match gas {
        Some(gas) => gas,
        None => client.estimate_gas(&tx).await?,
    };
    tx.gas = Some(gas);

    let tx_hash = client.send_transaction(tx).await?;
    debug!(target: "workspaces", "sent transaction {tx_hash} with gas limit {gas}");

    let receipt = client.wait_for_receipt(&tx_hash).await?;
    Ok(ExecutionFinalResult::from_receipt(receipt))
}

/// Builder for the transaction creating a new contract instance out of a
/// [`ContractFactory`].
pub struct DeployTransaction<'a> {
    factory: &'a ContractFactory,
    args: Vec<DynSolValue>,
    value: U256,
    gas: Option<Gas>,
}

impl<'a> DeployTransaction<'a> {
    pub(crate) fn new(factory: &'a ContractFactory) -> Self {
        Self {
            factory,
            args: Vec::new(),
            value: U256::ZERO,
            gas: None,
        }
    }

    /// Arguments passed to the constructor of the contract.
    pub fn args(mut self, args: Vec<DynSolValue>) -> Self {
        self.args = args;
        self
    }

    /// Amount of the native asset, in its smallest denomination, transferred to
    /// the contract on creation. Requires a payable constructor.
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Gas limit of the creation transaction. Estimated by the node if not set.
    pub fn gas(mut self, gas: Gas) -> Self {
        self.gas = Some(gas);
        self
    }

    fn creation_input(&self) -> Result<Bytes> {
        let artifact = &self.factory.artifact;
        let mut input = artifact.creation_code()?.to_vec();

        match artifact.abi.constructor() {
            Some(constructor) => {
                check_value("constructor", constructor.state_mutability, self.value)?;
                let args = constructor
                    .abi_encode_input(&self.args)
                    .map_err(|e| ErrorKind::Abi.full("invalid constructor arguments", e))?;
                input.extend(args);
            }
            None => {
                // Without an explicit constructor, the implicit one takes no
                // arguments and is not payable.
                check_value("constructor", StateMutability::NonPayable, self.value)?;
                if !self.args.is_empty() {
                    return Err(ErrorKind::Abi.message(format!(
                        "{} has no constructor but {} arguments were given",
                        artifact.contract_name,
                        self.args.len()
                    )));
                }
            }
        }

        Ok(input.into())
    }

    /// Send the creation transaction and wait until it has been mined. The returned
    /// [`Execution`] holds the new [`Contract`]; use `into_result` to also check
    /// that the creation did not revert.
    pub async fn transact(self) -> Result<Execution<Contract>> {
        let factory = self.factory;
        let client = factory.worker.client();
        let tx = TransactionRequest {
            from: Some(factory.signer.address()),
            value: (!self.value.is_zero()).then_some(self.value),
            input: TransactionInput::both(self.creation_input()?),
            ..Default::default()
        };

        let details = send_and_confirm(client, tx, self.gas).await?;
        let address = details.contract_address().copied().ok_or_else(|| {
            RpcErrorCode::QueryReturnedInvalidData.message(format!(
                "receipt of deployment {} has no contract address",
                details.transaction_hash()
            ))
        })?;

        if details.is_success() {
            // The contract only counts as deployed once code lives at its address.
            let code = client.code_at(&address).await?;
            if code.is_empty() {
                return Err(ErrorKind::Execution.message(format!(
                    "no code found at {address} after deploying {}",
                    factory.artifact.contract_name
                )));
            }
            info!(
                target: "workspaces",
                "deployed {} at {address} in block {:?}",
                factory.artifact.contract_name,
                details.block_number(),
            );
        }

        let contract = Contract::new(
            address,
            Arc::new(factory.artifact.abi.clone()),
            factory.signer,
            factory.worker.clone(),
        );
        Ok(Execution {
            result: contract,
            details,
        })
    }
}

/// Builder for a call into a function of a deployed [`Contract`]. Only one call
/// can be made per `CallTransaction`.
pub struct CallTransaction<'a> {
    contract: &'a Contract,
    function: &'a str,
    args: Vec<DynSolValue>,
    value: U256,
    gas: Option<Gas>,
    abi_checks: bool,
}

impl<'a> CallTransaction<'a> {
    pub(crate) fn new(contract: &'a Contract, function: &'a str) -> Self {
        Self {
            contract,
            function,
            args: Vec::new(),
            value: U256::ZERO,
            gas: None,
            abi_checks: true,
        }
    }

    /// Arguments of the call, in the order the function declares them.
    pub fn args(mut self, args: Vec<DynSolValue>) -> Self {
        self.args = args;
        self
    }

    /// Amount of the native asset, in its smallest denomination, attached to the call.
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Gas limit of the transaction. Estimated by the node if not set.
    pub fn gas(mut self, gas: Gas) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Send the call even if the ABI says the function does not accept the
    /// attached value, leaving it up to the network to reject it.
    pub fn skip_abi_checks(mut self) -> Self {
        self.abi_checks = false;
        self
    }

    /// The function being called, chosen among overloads by number of arguments.
    fn resolve(&self) -> Result<&'a Function> {
        let abi = &self.contract.abi;
        abi.function(self.function)
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|function| function.inputs.len() == self.args.len())
            })
            .ok_or_else(|| {
                ErrorKind::Abi.message(format!(
                    "no function {} taking {} arguments in the contract ABI",
                    self.function,
                    self.args.len()
                ))
            })
    }

    fn request(&self) -> Result<TransactionRequest> {
        let function = self.resolve()?;
        if self.abi_checks {
            check_value(self.function, function.state_mutability, self.value)?;
        }

        let input = function
            .abi_encode_input(&self.args)
            .map_err(|e| ErrorKind::Abi.full(format!("invalid arguments for {}", self.function), e))?;

        Ok(TransactionRequest {
            from: Some(self.contract.signer.address()),
            to: Some(TxKind::Call(self.contract.address)),
            value: (!self.value.is_zero()).then_some(self.value),
            input: TransactionInput::both(input.into()),
            ..Default::default()
        })
    }

    /// Finally, send the transaction to the network and wait for it to be mined.
    /// This will consume the `CallTransaction` and return the final result, which
    /// may still hold a reverted transaction: use `into_result` to check for it.
    pub async fn transact(self) -> Result<ExecutionFinalResult> {
        let tx = self.request()?;
        debug!(
            target: "workspaces",
            "calling {}.{} with value {}",
            self.contract.address,
            self.function,
            self.value,
        );
        send_and_confirm(self.contract.worker.client(), tx, self.gas).await
    }

    /// Instead of transacting, evaluate the call on the node's latest state
    /// without committing anything.
    pub async fn view(self) -> Result<ViewResultDetails> {
        let tx = self.request()?;
        let result = self.contract.worker.client().call(&tx).await?;
        Ok(ViewResultDetails { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_checks() {
        let one = U256::from(1u64);
        assert!(check_value("f", StateMutability::Payable, one).is_ok());
        assert!(check_value("f", StateMutability::NonPayable, U256::ZERO).is_ok());

        for mutability in [
            StateMutability::NonPayable,
            StateMutability::View,
            StateMutability::Pure,
        ] {
            let err = check_value("notPayable", mutability, one).unwrap_err();
            assert_eq!(*err.kind(), ErrorKind::NonPayableValue);
            assert!(err.to_string().contains(NON_PAYABLE_VALUE_MSG));
            assert!(err.to_string().contains("notPayable"));
        }
    }
}

use std::fmt;
use std::sync::Arc;

use crate::artifacts::Artifact;
use crate::operations::{CallTransaction, DeployTransaction};
use crate::types::{Address, JsonAbi};
use crate::{Network, Worker};

/// An account able to sign transactions. Signing itself happens on the node,
/// which must manage the account (as development nodes do for their funded
/// accounts).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signer {
    address: Address,
}

impl Signer {
    /// Refer to an account managed by the node by its address.
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// A builder that knows how to deploy one compiled contract, on behalf of one
/// signer. Obtained through [`Worker::contract_factory`].
#[derive(Clone)]
pub struct ContractFactory {
    pub(crate) artifact: Artifact,
    pub(crate) signer: Signer,
    pub(crate) worker: Worker<dyn Network>,
}

impl ContractFactory {
    pub(crate) fn new(artifact: Artifact, signer: Signer, worker: Worker<dyn Network>) -> Self {
        Self {
            artifact,
            signer,
            worker,
        }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Start building the transaction that creates a new instance of this
    /// contract. Constructor arguments, value and gas can be set on the
    /// returned builder before sending it with `transact`.
    pub fn deploy(&self) -> DeployTransaction<'_> {
        DeployTransaction::new(self)
    }
}

impl fmt::Debug for ContractFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractFactory")
            .field("contract", &self.artifact.contract_name)
            .field("signer", &self.signer)
            .finish()
    }
}

/// A contract deployed on the network, along with the ABI used to call into it
/// and the signer calls are made with.
#[derive(Clone)]
pub struct Contract {
    pub(crate) address: Address,
    pub(crate) abi: Arc<JsonAbi>,
    pub(crate) signer: Signer,
    pub(crate) worker: Worker<dyn Network>,
}

impl Contract {
    pub(crate) fn new(
        address: Address,
        abi: Arc<JsonAbi>,
        signer: Signer,
        worker: Worker<dyn Network>,
    ) -> Self {
        Self {
            address,
            abi,
            signer,
            worker,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// The same contract, with calls signed by `signer` instead.
    pub fn connect(&self, signer: Signer) -> Self {
        Self {
            signer,
            ..self.clone()
        }
    }

    /// Call a function of this contract. Returns a builder to set the arguments,
    /// attached value and gas of the call before sending it with `transact`, or
    /// evaluating it without a transaction with `view`.
    pub fn call<'a>(&'a self, function: &'a str) -> CallTransaction<'a> {
        CallTransaction::new(self, function)
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("signer", &self.signer)
            .finish()
    }
}

use std::sync::Arc;

use crate::artifacts::Artifact;
use crate::error::RpcErrorCode;
use crate::network::{ContractFactory, DevNetwork, Info, NetworkInfo, Signer};
use crate::result::Result;
use crate::rpc::client::Client;
use crate::types::{Address, Bytes, JsonAbi};
use crate::worker::Worker;
use crate::{Contract, Network};

impl<T: ?Sized> Clone for Worker<T> {
    fn clone(&self) -> Self {
        Self {
            workspace: self.workspace.clone(),
        }
    }
}

impl<T> NetworkInfo for Worker<T>
where
    T: NetworkInfo + ?Sized,
{
    fn info(&self) -> &Info {
        self.workspace.info()
    }
}

impl<T> Worker<T>
where
    T: Network + ?Sized,
{
    pub(crate) fn client(&self) -> &Client {
        self.workspace.client()
    }

    /// Chain id reported by the node when this worker connected to it.
    pub fn chain_id(&self) -> u64 {
        self.workspace.info().chain_id
    }

    /// Code deployed at `address`. Empty for accounts holding no contract.
    pub async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.client().code_at(&address).await
    }
}

impl<T> Worker<T>
where
    T: Network + 'static,
{
    /// Bind `artifact` to `signer`, producing a factory able to deploy new
    /// instances of the contract.
    pub fn contract_factory(&self, artifact: Artifact, signer: &Signer) -> ContractFactory {
        ContractFactory::new(artifact, *signer, self.clone().coerce())
    }

    /// Refer to a contract already deployed at `address`, calling into it with
    /// `abi` on behalf of `signer`.
    pub fn contract_at(&self, address: Address, abi: JsonAbi, signer: &Signer) -> Contract {
        Contract::new(address, Arc::new(abi), *signer, self.clone().coerce())
    }
}

impl<T> Worker<T>
where
    T: DevNetwork,
{
    /// Accounts managed by the node, in the order the node lists them.
    pub async fn signers(&self) -> Result<Vec<Signer>> {
        let accounts = self.client().accounts().await?;
        Ok(accounts.into_iter().map(Signer::new).collect())
    }

    /// The first account managed by the node, which development nodes fund
    /// by default.
    pub async fn signer(&self) -> Result<Signer> {
        self.signers().await?.into_iter().next().ok_or_else(|| {
            RpcErrorCode::NoAccountsAvailable.message(format!(
                "node at {} returned no accounts",
                self.info().rpc_url
            ))
        })
    }
}

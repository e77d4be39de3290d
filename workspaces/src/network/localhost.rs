use async_trait::async_trait;

use crate::network::builder::{FromNetworkBuilder, NetworkBuilder};
use crate::network::{AllowDevAccounts, Info, NetworkClient, NetworkInfo};
use crate::result::Result;
use crate::rpc::client::Client;

/// Address a development node (such as `hardhat node` or `anvil`) listens on
/// by default.
pub const RPC_URL: &str = "http://127.0.0.1:8545";

/// A development node running on the local machine, whose accounts are unlocked
/// and funded so they can sign transactions for us.
///
/// Look at [`evm_workspaces::localhost`] for how to connect to one.
///
/// [`evm_workspaces::localhost`]: crate::localhost
pub struct Localhost {
    client: Client,
    info: Info,
}

#[async_trait]
impl FromNetworkBuilder for Localhost {
    async fn from_builder<'a>(build: NetworkBuilder<'a, Self>) -> Result<Self> {
        let rpc_url = build.rpc_addr.unwrap_or_else(|| RPC_URL.into());
        let client = Client::new(&rpc_url, build.api_key)?;
        client.wait_for_rpc(build.rpc_timeout).await?;
        let chain_id = client.chain_id().await?;

        Ok(Self {
            info: Info {
                name: build.name.into(),
                chain_id,
                rpc_url: client.rpc_addr().clone(),
            },
            client,
        })
    }
}

impl std::fmt::Debug for Localhost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Localhost")
            .field("chain_id", &self.info.chain_id)
            .field("rpc_url", &self.info.rpc_url)
            .finish()
    }
}

impl AllowDevAccounts for Localhost {}

impl NetworkClient for Localhost {
    fn client(&self) -> &Client {
        &self.client
    }
}

impl NetworkInfo for Localhost {
    fn info(&self) -> &Info {
        &self.info
    }
}

use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::network::builder::{FromNetworkBuilder, NetworkBuilder};
use crate::network::{AllowDevAccounts, Info, NetworkClient, NetworkInfo};
use crate::result::Result;
use crate::rpc::client::Client;

/// Holds information about a custom network: any node reachable over JSON-RPC.
/// Signers are only available when that node manages unlocked accounts.
pub struct Custom {
    client: Client,
    info: Info,
}

#[async_trait]
impl FromNetworkBuilder for Custom {
    async fn from_builder<'a>(build: NetworkBuilder<'a, Self>) -> Result<Self> {
        let rpc_url = build.rpc_addr.ok_or_else(|| {
            ErrorKind::DataConversion.message("rpc address should be provided for custom network")
        })?;
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

impl std::fmt::Debug for Custom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Custom")
            .field("chain_id", &self.info.chain_id)
            .field("rpc_url", &self.info.rpc_url)
            .finish()
    }
}

impl AllowDevAccounts for Custom {}

impl NetworkClient for Custom {
    fn client(&self) -> &Client {
        &self.client
    }
}

impl NetworkInfo for Custom {
    fn info(&self) -> &Info {
        &self.info
    }
}

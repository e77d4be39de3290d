mod impls;

use std::fmt;
use std::sync::Arc;

use crate::network::builder::NetworkBuilder;
use crate::network::{Custom, Localhost};
use crate::Network;

/// The `Worker` type allows us to interact with any network that implements the
/// [`Network`] trait. It is cheap to clone, and every clone talks to the same
/// node through the same client.
pub struct Worker<T: ?Sized> {
    pub(crate) workspace: Arc<T>,
}

impl<T> Worker<T>
where
    T: Network,
{
    pub(crate) fn new(network: T) -> Self {
        Self {
            workspace: Arc::new(network),
        }
    }
}

impl<T: Network + 'static> Worker<T> {
    pub(crate) fn coerce(self) -> Worker<dyn Network> {
        Worker {
            workspace: self.workspace,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("workspace", &self.workspace)
            .finish()
    }
}

/// Connect to a development node running on the local machine, and grab a
/// [`Worker`] that can interact with it. The node is expected at
/// `http://127.0.0.1:8545` unless another address is set through the builder.
pub fn localhost<'a>() -> NetworkBuilder<'a, Localhost> {
    NetworkBuilder::new("localhost")
}

/// Connect to the node listening at `rpc_addr`, and grab a [`Worker`] that can
/// interact with it.
pub fn custom<'a>(rpc_addr: &str) -> NetworkBuilder<'a, Custom> {
    NetworkBuilder::new("custom").rpc_addr(rpc_addr)
}

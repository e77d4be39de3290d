use crate::network::Info;
use crate::rpc::client::Client;

pub trait NetworkClient {
    fn client(&self) -> &Client;
}

pub trait NetworkInfo {
    fn info(&self) -> &Info;
}

// NOTE: Not all networks will have the node sign transactions on our behalf.
// This trait acts as segmented boundary for only specific networks such as a
// local development node, whose accounts are unlocked and funded.
pub trait AllowDevAccounts {}

pub trait Network: NetworkInfo + NetworkClient + Send + Sync {}

impl<T> Network for T where T: NetworkInfo + NetworkClient + Send + Sync {}

/// DevNetwork is a Network whose node manages accounts that can be used as
/// signers, through [`Worker::signers`].
///
/// [`Worker::signers`]: crate::Worker::signers
pub trait DevNetwork: AllowDevAccounts + Network + 'static {}

// Implemented by default if we have `AllowDevAccounts`
impl<T> DevNetwork for T where T: AllowDevAccounts + Network + 'static {}

use url::Url;

#[derive(Clone, Debug)]
pub struct Info {
    /// Name of the network itself
    pub name: String,
    /// Chain id reported by the node when we connected to it.
    pub chain_id: u64,
    /// Rpc endpoint to point our client to
    pub rpc_url: Url,
}

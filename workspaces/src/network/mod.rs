//! All builtin network types and traits that are used to connect to a node
//! and interact with it.

mod account;
pub(crate) mod builder;
mod custom;
mod info;
mod localhost;
mod variants;

pub use self::account::{Contract, ContractFactory, Signer};
pub use self::builder::NetworkBuilder;
pub use self::custom::Custom;
pub use self::info::Info;
pub use self::localhost::{Localhost, RPC_URL};
pub use self::variants::{AllowDevAccounts, DevNetwork, Network, NetworkClient, NetworkInfo};

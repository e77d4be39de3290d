//! Library for automating workflows and testing EVM smart contracts against a
//! node reachable over JSON-RPC.
//!
//! ```no_run
//! # async fn run() -> evm_workspaces::result::Result<()> {
//! use evm_workspaces::{types::parse_ether, ArtifactStore};
//!
//! let worker = evm_workspaces::localhost().await?;
//! let signer = worker.signer().await?;
//! let artifact = ArtifactStore::new("artifacts").get("Payable")?;
//!
//! let contract = worker
//!     .contract_factory(artifact, &signer)
//!     .deploy()
//!     .transact()
//!     .await?
//!     .into_result()?;
//!
//! contract
//!     .call("pay")
//!     .value(parse_ether("1")?)
//!     .transact()
//!     .await?
//!     .into_result()?;
//! # Ok(())
//! # }
//! ```

mod worker;

pub mod artifacts;
pub mod error;
pub mod network;
pub mod operations;
pub mod result;
pub mod rpc;
pub mod types;

pub use self::artifacts::{Artifact, ArtifactStore};
pub use self::error::{Error, ErrorKind};
pub use self::network::{Contract, ContractFactory, DevNetwork, Network, Signer};
pub use self::result::Result;
pub use self::worker::{custom, localhost, Worker};

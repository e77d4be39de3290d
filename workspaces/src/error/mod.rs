//! All errors that can occur within workspaces, including but not limited to
//! the following: IO, RPC, artifact loading, ABI checks and data conversion.

mod impls;

use std::borrow::Cow;

use crate::result::ExecutionFinalResult;

/// Message produced when a value is attached to a call into a function that
/// is not declared `payable`.
pub const NON_PAYABLE_VALUE_MSG: &str = "non-payable method cannot override value";

/// A list specifying general categories of errors from workspaces.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An error occurred while performing an RPC request.
    #[error("{0}")]
    Rpc(#[from] RpcErrorCode),
    /// An error occurred while processing a transaction on chain.
    #[error("Execution")]
    Execution,
    /// An error occurred while locating or reading a compiled contract.
    #[error("{0}")]
    Artifact(#[from] ArtifactErrorCode),
    /// The call does not match the contract's ABI.
    #[error("Abi")]
    Abi,
    /// A value was attached to a function that does not accept one.
    #[error("{}", NON_PAYABLE_VALUE_MSG)]
    NonPayableValue,
    /// An error having to do with IO.
    #[error("IO")]
    Io,
    /// An error occurred while converting data between formats.
    #[error("DataConversion")]
    DataConversion,
    /// An error that cannot be categorized into the other error kinds.
    #[error("Other")]
    Other,
}

#[derive(Debug, thiserror::Error)]
enum ErrorRepr {
    #[error("{0}")]
    Simple(ErrorKind),
    #[error("{message}")]
    Message {
        kind: ErrorKind,
        message: Cow<'static, str>,
    },
    #[error("{error}")]
    Custom {
        kind: ErrorKind,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{message}: {error}")]
    Full {
        kind: ErrorKind,
        message: Cow<'static, str>,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{error}")]
    Detailed {
        kind: ErrorKind,
        result: Box<ExecutionFinalResult>,
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Error type that workspaces will make use of for all the errors
/// returned from this library
#[derive(Debug)]
pub struct Error {
    repr: ErrorRepr,
}

/// Errors coming from talking to the node over JSON-RPC.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum RpcErrorCode {
    #[error("failed to connect to rpc service")]
    ConnectionFailure,
    #[error("unable to broadcast the transaction to the network")]
    BroadcastTxFailure,
    #[error("unable to estimate gas for the transaction")]
    EstimateGasFailure,
    #[error("unable to fulfill the query request")]
    QueryFailure,
    #[error("incorrect data retrieved while querying (maybe a bug in RPC code?)")]
    QueryReturnedInvalidData,
    #[error("the node does not manage any accounts to sign with")]
    NoAccountsAvailable,
    #[error("rpc service returned an error")]
    ErrorResponse,
}

/// Errors coming from locating and reading compiled contract artifacts.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ArtifactErrorCode {
    #[error("contract not found or not compiled")]
    NotFound,
    #[error("contract artifact is malformed")]
    Malformed,
    #[error("contract artifact has no deployable bytecode")]
    MissingBytecode,
}

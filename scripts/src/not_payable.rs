//! Deploys a contract and checks that attaching value to one of its
//! non-payable methods gets rejected before anything executes.

use evm_workspaces::error::NON_PAYABLE_VALUE_MSG;
use evm_workspaces::result::ExecutionFinalResult;
use evm_workspaces::types::Address;
use evm_workspaces::{ArtifactStore, DevNetwork, Error, ErrorKind, Worker};
use tracing::warn;

use crate::RunnerConfig;

/// How the value-bearing call turned out.
#[derive(Debug)]
pub enum Verdict {
    /// The call was rejected for carrying value.
    Passed,
    /// The call failed for some other reason.
    Failed(Error),
    /// The call went through. Nothing flags this as a failure, so it exits
    /// like a pass does.
    NotRejected(ExecutionFinalResult),
}

impl Verdict {
    pub fn classify(result: evm_workspaces::Result<ExecutionFinalResult>) -> Self {
        match result {
            Ok(details) => Self::NotRejected(details),
            Err(err) if is_value_rejection(&err) => Self::Passed,
            Err(err) => Self::Failed(err),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Passed | Self::NotRejected(_) => 0,
            Self::Failed(_) => 1,
        }
    }
}

/// Whether `err` rejects value sent to a non-payable method. Nodes only give
/// us text, so their errors are matched on the message.
pub fn is_value_rejection(err: &Error) -> bool {
    matches!(err.kind(), ErrorKind::NonPayableValue)
        || err.to_string().contains(NON_PAYABLE_VALUE_MSG)
}

/// Result of a run that made it to the call.
#[derive(Debug)]
pub struct Outcome {
    /// Address the contract was deployed to.
    pub contract: Address,
    pub verdict: Verdict,
}

/// Deploy `config.contract` with the first signer of `worker`, then call
/// `config.method` on it with `config.value` attached. Errors before the call
/// is made are returned as is; errors of the call itself are classified into
/// the [`Verdict`].
pub async fn run<T>(
    worker: &Worker<T>,
    artifacts: &ArtifactStore,
    config: &RunnerConfig,
) -> evm_workspaces::Result<Outcome>
where
    T: DevNetwork,
{
    let signer = worker.signer().await?;
    let artifact = artifacts.get(&config.contract)?;
    let contract = worker
        .contract_factory(artifact, &signer)
        .deploy()
        .transact()
        .await?
        .into_result()?;
    println!("{} Contract deployed to: {}", config.contract, contract.address());

    println!("Calling {}()", config.method);
    let mut call = contract.call(&config.method).value(config.value);
    if config.skip_abi_checks {
        call = call.skip_abi_checks();
    }
    let result = call.transact().await;
    if let Err(err) = &result {
        eprintln!("{err}");
    }

    let verdict = Verdict::classify(result);
    match &verdict {
        Verdict::Passed => println!("test passed"),
        Verdict::Failed(_) => println!("test failed"),
        Verdict::NotRejected(details) => warn!(
            target: "workspaces",
            "{}() accepted a value of {} in transaction {}",
            config.method,
            config.value,
            details.transaction_hash(),
        ),
    }

    Ok(Outcome {
        contract: contract.address(),
        verdict,
    })
}

/// Connect using `config` and [`run`], mapping every way the run can end to
/// the process exit code: the verdict's, or 1 for any error along the way.
pub async fn execute(config: &RunnerConfig) -> u8 {
    let outcome = match config.connect().await {
        Ok(worker) => run(&worker, &config.artifacts(), config).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(outcome) => outcome.verdict.exit_code(),
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

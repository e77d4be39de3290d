//! Scripts driving contracts on a development node through `evm-workspaces`.

pub mod config;
pub mod not_payable;

pub use self::config::RunnerConfig;
pub use self::not_payable::{execute, run, Outcome, Verdict};

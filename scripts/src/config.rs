use std::path::PathBuf;

use anyhow::Context;
use evm_workspaces::network::{Localhost, RPC_URL};
use evm_workspaces::types::{ONE_ETHER, U256};
use evm_workspaces::{ArtifactStore, Worker};

/// Everything the runner needs to know about where it runs and what it calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    /// JSON-RPC endpoint of the development node.
    pub rpc_url: String,
    /// Sent along every request when the endpoint requires one.
    pub api_key: Option<String>,
    /// Root of the Hardhat `artifacts/` directory.
    pub artifacts_dir: PathBuf,
    /// Contract to deploy, by bare or fully qualified name.
    pub contract: String,
    /// Non-payable method called with `value` attached.
    pub method: String,
    /// Attached to the call, in wei.
    pub value: U256,
    /// Leave the rejection of the value up to the node instead of checking
    /// the ABI first.
    pub skip_abi_checks: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            rpc_url: RPC_URL.into(),
            api_key: None,
            artifacts_dir: PathBuf::from("artifacts"),
            contract: "Payable".into(),
            method: "notPayable".into(),
            value: ONE_ETHER,
            skip_abi_checks: false,
        }
    }
}

impl RunnerConfig {
    /// Read the configuration from `EVM_*` environment variables, falling back
    /// to the defaults for those that are unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(rpc_url) = lookup("EVM_RPC_URL") {
            config.rpc_url = rpc_url;
        }
        config.api_key = lookup("EVM_RPC_API_KEY").filter(|key| !key.is_empty());
        if let Some(dir) = lookup("EVM_ARTIFACTS_DIR") {
            config.artifacts_dir = dir.into();
        }
        if let Some(skip) = lookup("EVM_SKIP_ABI_CHECKS") {
            config.skip_abi_checks = parse_flag(&skip)
                .with_context(|| format!("invalid EVM_SKIP_ABI_CHECKS `{skip}`"))?;
        }
        Ok(config)
    }

    /// Connect to the configured node.
    pub async fn connect(&self) -> evm_workspaces::Result<Worker<Localhost>> {
        let builder = evm_workspaces::localhost().rpc_addr(&self.rpc_url);
        match &self.api_key {
            Some(key) => builder.api_key(key).await,
            None => builder.await,
        }
    }

    pub fn artifacts(&self) -> ArtifactStore {
        ArtifactStore::new(&self.artifacts_dir)
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => anyhow::bail!("expected true or false"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let config = RunnerConfig::from_lookup(lookup(&[]))?;
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.contract, "Payable");
        assert_eq!(config.method, "notPayable");
        assert_eq!(config.value, U256::from(1_000_000_000_000_000_000u128));
        assert!(!config.skip_abi_checks);
        Ok(())
    }

    #[test]
    fn test_overrides() -> anyhow::Result<()> {
        let config = RunnerConfig::from_lookup(lookup(&[
            ("EVM_RPC_URL", "http://10.0.0.2:8545"),
            ("EVM_RPC_API_KEY", "secret"),
            ("EVM_ARTIFACTS_DIR", "build/artifacts"),
            ("EVM_SKIP_ABI_CHECKS", "TRUE"),
        ]))?;
        assert_eq!(config.rpc_url, "http://10.0.0.2:8545");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.artifacts_dir, PathBuf::from("build/artifacts"));
        assert!(config.skip_abi_checks);

        let config = RunnerConfig::from_lookup(lookup(&[("EVM_RPC_API_KEY", "")]))?;
        assert_eq!(config.api_key, None);
        Ok(())
    }

    #[test]
    fn test_invalid_flag() {
        let err = RunnerConfig::from_lookup(lookup(&[("EVM_SKIP_ABI_CHECKS", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("EVM_SKIP_ABI_CHECKS"));
    }
}

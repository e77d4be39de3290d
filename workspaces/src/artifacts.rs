//! Loading of compiled contracts. Artifacts are read in the format Hardhat
//! writes them to its `artifacts/` directory: one JSON file per contract at
//! `artifacts/<source path>/<ContractName>.json`, next to a `.dbg.json` file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ArtifactErrorCode, ErrorKind};
use crate::result::Result;
use crate::types::{Bytes, JsonAbi};

/// A compiled contract: its ABI and the bytecode used to deploy it.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    #[serde(default)]
    pub deployed_bytecode: Bytes,
}

impl Artifact {
    /// Parse an artifact from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)
            .map_err(|e| ArtifactErrorCode::Malformed.full("invalid artifact json", e))?;
        Ok(artifact)
    }

    /// Read an artifact from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ErrorKind::Io.full(format!("unable to read artifact {}", path.display()), e)
        })?;
        serde_json::from_str(&json).map_err(|e| {
            ArtifactErrorCode::Malformed.full(format!("invalid artifact {}", path.display()), e)
        })
    }

    /// `<source name>:<contract name>`, uniquely identifying this contract.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Bytecode to deploy, failing for contracts that cannot be deployed such as
    /// interfaces and abstract contracts.
    pub(crate) fn creation_code(&self) -> Result<&Bytes> {
        if self.bytecode.is_empty() {
            return Err(ArtifactErrorCode::MissingBytecode.message(format!(
                "{} has no bytecode (is it abstract or an interface?)",
                self.contract_name
            )));
        }
        Ok(&self.bytecode)
    }
}

/// The set of compiled contracts living under an artifacts directory.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a contract by name. `name` can either be the bare contract name
    /// (`Payable`), which must be unique across the artifacts, or the fully
    /// qualified name (`contracts/Payable.sol:Payable`).
    pub fn get(&self, name: &str) -> Result<Artifact> {
        let path = match name.rsplit_once(':') {
            Some((source, contract)) => {
                let path = self.root.join(source).join(format!("{contract}.json"));
                if !path.is_file() {
                    return Err(not_found(name, &self.root));
                }
                path
            }
            None => self.find(name)?,
        };

        debug!(target: "workspaces", "loading artifact {name} from {}", path.display());
        Artifact::from_file(path)
    }

    fn find(&self, contract: &str) -> Result<PathBuf> {
        let file_name = format!("{contract}.json");
        let mut found = Vec::new();
        collect_matching(&self.root, &file_name, &mut found)?;

        match found.len() {
            0 => Err(not_found(contract, &self.root)),
            1 => Ok(found.remove(0)),
            _ => {
                found.sort();
                let candidates = found
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(ArtifactErrorCode::NotFound.message(format!(
                    "multiple artifacts named {contract}, use a fully qualified name: {candidates}"
                )))
            }
        }
    }
}

fn not_found(name: &str, root: &Path) -> crate::error::Error {
    ArtifactErrorCode::NotFound.message(format!(
        "contract {name} not found in {} (has it been compiled?)",
        root.display()
    ))
}

/// Recursively gather every file named `file_name` under `dir`. Build info is
/// skipped since it holds compiler input/output rather than artifacts.
fn collect_matching(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(ErrorKind::Io.full(format!("unable to read {}", dir.display()), err))
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| ErrorKind::Io.custom(e))?;
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() != "build-info" {
                collect_matching(&path, file_name, found)?;
            }
        } else if entry.file_name() == file_name {
            found.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYABLE_ARTIFACT: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "Payable",
        "sourceName": "contracts/Payable.sol",
        "abi": [
            {
                "inputs": [],
                "name": "notPayable",
                "outputs": [],
                "stateMutability": "nonpayable",
                "type": "function"
            }
        ],
        "bytecode": "0x6080604052348015600f57600080fd5b50",
        "deployedBytecode": "0x6080604052",
        "linkReferences": {},
        "deployedLinkReferences": {}
    }"#;

    fn write(root: &Path, rel: &str, contents: &str) -> anyhow::Result<()> {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(path, contents)?;
        Ok(())
    }

    #[test]
    fn test_find_by_bare_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "contracts/Payable.sol/Payable.json", PAYABLE_ARTIFACT)?;
        write(dir.path(), "contracts/Payable.sol/Payable.dbg.json", "{}")?;
        write(dir.path(), "build-info/Payable.json", "{}")?;

        let artifact = ArtifactStore::new(dir.path()).get("Payable")?;
        assert_eq!(artifact.contract_name, "Payable");
        assert_eq!(artifact.fully_qualified_name(), "contracts/Payable.sol:Payable");
        assert!(artifact.abi.function("notPayable").is_some());
        assert!(artifact.creation_code().is_ok());
        Ok(())
    }

    #[test]
    fn test_find_by_fully_qualified_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "contracts/Payable.sol/Payable.json", PAYABLE_ARTIFACT)?;
        write(dir.path(), "contracts/Other.sol/Payable.json", PAYABLE_ARTIFACT)?;

        let store = ArtifactStore::new(dir.path());
        let err = store.get("Payable").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Artifact(ArtifactErrorCode::NotFound));
        assert!(err.to_string().contains("fully qualified"));

        let artifact = store.get("contracts/Payable.sol:Payable")?;
        assert_eq!(artifact.contract_name, "Payable");
        Ok(())
    }

    #[test]
    fn test_missing_artifact() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ArtifactStore::new(dir.path().join("artifacts"));

        let err = store.get("Payable").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Artifact(ArtifactErrorCode::NotFound));

        let err = store.get("contracts/Payable.sol:Payable").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Artifact(ArtifactErrorCode::NotFound));
        Ok(())
    }

    #[test]
    fn test_malformed_and_abstract_artifacts() -> anyhow::Result<()> {
        let err = Artifact::from_json("{\"contractName\": 1}").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Artifact(ArtifactErrorCode::Malformed));

        let interface = PAYABLE_ARTIFACT
            .replace("0x6080604052348015600f57600080fd5b50", "0x")
            .replace("0x6080604052", "0x");
        let artifact = Artifact::from_json(&interface)?;
        let err = artifact.creation_code().unwrap_err();
        assert_eq!(
            *err.kind(),
            ErrorKind::Artifact(ArtifactErrorCode::MissingBytecode)
        );
        Ok(())
    }
}

//! Types used in the workspaces crate. Primitive chain types are re-exported from
//! `alloy-primitives` and ABI types from `alloy-json-abi`, so library consumers do
//! not need to depend on them directly.

use alloy_primitives::utils::{ParseUnits, UnitsError};

pub use alloy_dyn_abi::DynSolValue;
pub use alloy_json_abi::{Function, JsonAbi, StateMutability};
pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};

use crate::error::ErrorKind;
use crate::result::Result;

/// Gas units used in the execution of transactions.
pub type Gas = u64;

/// Height of a specific block
pub type BlockHeight = u64;

/// Hash identifying a transaction on the network.
pub type TxHash = B256;

/// One ether, in wei.
pub const ONE_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Convert a human readable decimal `amount` denominated in `unit` (`"ether"`,
/// `"gwei"`, `"wei"`, ...) into the smallest denomination of the native asset.
///
/// ```
/// use evm_workspaces::types::{parse_units, U256};
///
/// let wei = parse_units("1", "ether").unwrap();
/// assert_eq!(wei, U256::from(10u64).pow(U256::from(18u64)));
/// ```
pub fn parse_units(amount: &str, unit: &str) -> Result<U256> {
    let units = alloy_primitives::utils::parse_units(amount, unit)
        .map_err(|err| units_error(amount, unit, err))?;
    match units {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(value) if value.is_negative() => Err(ErrorKind::DataConversion
            .message(format!("`{amount}` {unit} is negative"))),
        ParseUnits::I256(value) => Ok(value.into_raw()),
    }
}

/// Shortcut for [`parse_units`] with `unit` set to `"ether"`.
pub fn parse_ether(amount: &str) -> Result<U256> {
    parse_units(amount, "ether")
}

fn units_error(amount: &str, unit: &str, err: UnitsError) -> crate::error::Error {
    ErrorKind::DataConversion.full(format!("unable to parse `{amount}` as {unit}"), err)
}

/// Whether the function accepts a value attached to the call.
pub(crate) fn is_payable(mutability: StateMutability) -> bool {
    matches!(mutability, StateMutability::Payable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() -> anyhow::Result<()> {
        let one_ether = U256::from(1_000_000_000_000_000_000u128);
        assert_eq!(parse_ether("1")?, one_ether);
        assert_eq!(ONE_ETHER, one_ether);
        assert_eq!(parse_units("1", "ether")?, one_ether);
        assert_eq!(parse_units("1.5", "gwei")?, U256::from(1_500_000_000u64));
        assert_eq!(parse_units("7", "wei")?, U256::from(7u64));
        Ok(())
    }

    #[test]
    fn test_parse_units_invalid() {
        let err = parse_ether("one").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::DataConversion);

        let err = parse_units("1", "bogus").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::DataConversion);

        for negative in ["-1", "-0.5"] {
            let err = parse_ether(negative).unwrap_err();
            assert_eq!(*err.kind(), ErrorKind::DataConversion);
            assert!(err.to_string().contains("negative"));
        }
    }

    #[test]
    fn test_payable_mutability() {
        assert!(is_payable(StateMutability::Payable));
        assert!(!is_payable(StateMutability::NonPayable));
        assert!(!is_payable(StateMutability::View));
        assert!(!is_payable(StateMutability::Pure));
    }
}

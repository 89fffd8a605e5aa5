// vault/src/lib.rs

//! Autocompounding share vault over the locked token
//!
//! Shares are a claim on locked tokens held through the yield-bearing voting
//! deposit. Deposits are gated by per-period unlock windows (and always
//! closed in the final hour before a period boundary); withdrawals are never
//! gated. The operator periodically compounds accrued liquid-token yield
//! through the conversion penalty and may route incentive tokens through
//! whitelisted aggregators under strict snapshot/assert invariants.

pub mod incentives;
pub mod vault;

#[cfg(test)]
pub(crate) mod testutil;

pub use incentives::{unwrap_lp, RescueRecord, SwapParams, SwapRecord};
pub use vault::{CompoundRecord, CompoundingVault, RATIO_SCALE};

use protocol_core::Amount;

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors that can occur in vault operations
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Caller is not the operator")]
    NotOperator,

    #[error("Caller is not the access hub")]
    NotAccessHub,

    #[error("Vault is locked")]
    Locked,

    #[error("Reentrant call")]
    Reentrancy,

    #[error("Aggregator is not whitelisted")]
    AggregatorNotWhitelisted,

    #[error("Token is forbidden")]
    ForbiddenToken,

    #[error("Amount out too low: expected at least {min_out}, got {actual}")]
    AmountOutTooLow { min_out: Amount, actual: Amount },

    #[error("Operation would mint or burn zero shares")]
    ZeroShares,

    #[error("Array length mismatch: {left} vs {right}")]
    ArrayLengthMismatch { left: usize, right: usize },

    #[error("Vote weights total {total} exceeds the basis")]
    WeightsExceedBasis { total: u128 },

    #[error("Aggregator call reverted: {0}")]
    AggregatorCallFailed(String),

    #[error(transparent)]
    Conversion(#[from] conversion::ConversionError),

    #[error(transparent)]
    Ledger(#[from] protocol_core::CoreError),

    #[error(transparent)]
    Collaborator(#[from] protocol_core::CollaboratorError),
}

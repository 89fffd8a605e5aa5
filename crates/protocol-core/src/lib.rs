// protocol-core/src/lib.rs

//! Shared leaf types for the exchange emission protocol
//!
//! This crate provides:
//! - Token amounts with exact basis-point arithmetic
//! - Account addresses
//! - Period/epoch derivations from an explicit timestamp
//! - The generic fungible-token ledger shared by both token forms
//! - Boundary traits for the external collaborators

pub mod address;
pub mod ledger;
pub mod period;
pub mod traits;
pub mod types;

pub use address::Address;
pub use ledger::TokenLedger;
pub use period::{epoch_of, in_final_hour, period_of, period_start, period_start_utc};
pub use traits::{Aggregator, CollaboratorError, LpProbe, VotingDeposit, VotingModule};
pub use types::{Amount, PeriodIndex, Timestamp, BPS_BASIS, HOUR_SECONDS, WEEK_SECONDS};

/// Result type for core ledger operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core ledger operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient allowance")]
    InsufficientAllowance,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

// conversion/src/lib.rs

//! Restricted-transfer locked token with an irreversible conversion penalty
//!
//! Liquid tokens convert into the locked form at full face value while half
//! the backing is burned (rounded up), and exit back to liquid form under the
//! same penalty. Transfers of the locked token are denied unless an
//! exemption rule matches; registered reward distributors are whitelisted
//! lazily on their first observed transfer.

pub mod restrictions;
pub mod token;

pub use token::{ConversionConfig, ConversionToken, PenaltyBreakdown};

use protocol_core::Address;

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Errors that can occur in conversion operations
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Caller is not the operator")]
    NotOperator,

    #[error("Caller is not the emission controller")]
    NotEmissionController,

    #[error("Operations are paused")]
    Paused,

    #[error("Zero amount")]
    ZeroAmount,

    #[error("Transfer from {from} to {to} is not whitelisted")]
    NotWhitelisted { from: Address, to: Address },

    #[error("Array length mismatch: {left} vs {right}")]
    ArrayLengthMismatch { left: usize, right: usize },

    #[error("No change")]
    NoChange,

    #[error("Cannot rescue the underlying token")]
    CannotRescueUnderlying,

    #[error(transparent)]
    Ledger(#[from] protocol_core::CoreError),

    #[error(transparent)]
    Collaborator(#[from] protocol_core::CollaboratorError),
}

// emissions/src/lib.rs

//! Weekly emission schedule with a governance-adjustable, clamped multiplier
//!
//! The controller mints the liquid token once per period, hands the minted
//! amount to the downstream distribution module, and bounds how fast
//! governance can move the emission multiplier (±100% for the first three
//! epochs, ±25% afterwards). Total minted supply never exceeds the
//! configured maximum.

pub mod controller;

pub use controller::{EmissionConfig, EmissionController, EmissionRecord};

/// Result type for emission operations
pub type EmissionsResult<T> = Result<T, EmissionsError>;

/// Errors that can occur in emission operations
#[derive(Debug, thiserror::Error)]
pub enum EmissionsError {
    #[error("Caller is not the operator")]
    NotOperator,

    #[error("Caller is not governance")]
    NotGovernor,

    #[error("Emissions already started")]
    AlreadyStarted,

    #[error("Emissions not started")]
    EmissionsNotStarted,

    #[error("Null reference argument")]
    InvalidReference,

    #[error("Multiplier already adjusted this period")]
    SamePeriod,

    #[error("Adjustment of {delta_bps} bp outside allowed bound of {bound_bps} bp")]
    OutOfBounds { delta_bps: i64, bound_bps: i64 },

    #[error("Adjustment is a no-op")]
    NoChange,

    #[error("Adjustment would zero the multiplier")]
    WouldZeroMultiplier,

    #[error(transparent)]
    Ledger(#[from] protocol_core::CoreError),

    #[error(transparent)]
    Collaborator(#[from] protocol_core::CollaboratorError),
}

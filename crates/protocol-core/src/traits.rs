// protocol-core/src/traits.rs
//
// Boundary traits for the external collaborators. These modules live outside
// this repository; only their call surface is specified here. Implementations
// receive the ledgers they act on as explicit arguments so the engine keeps
// single-writer access to all shared state.

use crate::{Address, Amount, PeriodIndex, TokenLedger, Timestamp};

/// Failure reported by an external collaborator, carrying its raw payload.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Collaborator call failed: {0}")]
pub struct CollaboratorError(pub String);

/// Voting and reward-distribution module.
pub trait VotingModule {
    fn get_period(&self, now: Timestamp) -> PeriodIndex;

    /// Whether `account` is a registered gauge.
    fn is_gauge(&self, account: &Address) -> bool;

    /// Whether `account` is a registered fee distributor.
    fn is_fee_distributor(&self, account: &Address) -> bool;

    /// Receive a reward notification; pulls `amount` liquid tokens from
    /// `from` using a previously granted allowance.
    fn notify_reward_amount(
        &mut self,
        liquid: &mut TokenLedger,
        from: Address,
        amount: &Amount,
    ) -> Result<(), CollaboratorError>;

    fn vote(
        &mut self,
        principal: Address,
        pools: &[Address],
        weights: &[u64],
    ) -> Result<(), CollaboratorError>;

    fn claim_incentives(
        &mut self,
        principal: Address,
        distributors: &[Address],
        tokens: &[Vec<Address>],
    ) -> Result<(), CollaboratorError>;
}

/// Yield-bearing voting deposit holding locked tokens on behalf of principals.
pub trait VotingDeposit {
    /// Pull `amount` locked tokens from `principal` and credit its position.
    fn deposit(
        &mut self,
        locked: &mut TokenLedger,
        principal: Address,
        amount: &Amount,
    ) -> Result<(), CollaboratorError>;

    /// Deposit the principal's entire locked balance; returns the amount moved.
    fn deposit_all(
        &mut self,
        locked: &mut TokenLedger,
        principal: Address,
    ) -> Result<Amount, CollaboratorError>;

    /// Debit `principal`'s position and pay `amount` locked tokens to `to`.
    fn withdraw(
        &mut self,
        locked: &mut TokenLedger,
        principal: Address,
        to: Address,
        amount: &Amount,
    ) -> Result<(), CollaboratorError>;

    fn balance_of(&self, principal: &Address) -> Amount;

    /// Timestamp until which withdrawals from the deposit are on cooldown.
    fn unlock_time(&self) -> Timestamp;

    fn notify_reward_amount(&mut self, amount: &Amount) -> Result<(), CollaboratorError>;
}

/// Whitelisted swap venue executing caller-supplied calldata. Untrusted: it
/// may attempt anything the references it is handed allow, which is why the
/// vault snapshots its invariants around every call.
pub trait Aggregator {
    fn execute(
        &mut self,
        payload: &[u8],
        liquid: &mut TokenLedger,
        locked: &mut TokenLedger,
        deposit: &mut dyn VotingDeposit,
    ) -> Result<(), CollaboratorError>;
}

/// Probe for LP-pair tokens. Fails on non-conforming tokens; callers treat
/// that failure as "not an LP token" rather than aborting.
pub trait LpProbe {
    fn lp_components(&self, token: &Address) -> Result<(Address, Address), CollaboratorError>;
}

// conversion/src/token.rs

use crate::{ConversionError, ConversionResult};
use protocol_core::{
    period_of, Address, Amount, PeriodIndex, Timestamp, TokenLedger, VotingDeposit,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Penalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Penalty numerator (500_000 = 50% at the default basis)
    pub penalty_numerator: u64,
    /// Penalty basis (1_000_000 scale)
    pub penalty_basis: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            penalty_numerator: 500_000,
            penalty_basis: 1_000_000,
        }
    }
}

/// Cumulative penalty accounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    /// Liquid tokens destroyed, total
    pub total_burned: Amount,
    /// Liquid tokens destroyed by conversions
    pub convert_burned: Amount,
    /// Liquid tokens forfeited to the reserve by exits (not destroyed)
    pub exit_forfeited: Amount,
}

/// Locked, vote-weighted form of the liquid token.
///
/// Conversion mints the locked token at full face value while burning the
/// penalty from the pulled backing only, so locked supply can exceed the
/// liquid reserve actually held. `exit` clamps its payout to the reserve and
/// nothing else corrects the drift; see DESIGN.md for the economic-review
/// flag on this behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionToken {
    config: ConversionConfig,
    /// Token's own ledger account on the liquid ledger (holds the reserve)
    address: Address,
    operator: Address,
    /// Only caller allowed to drive `rebase`
    emission_controller: Address,
    /// Underlying liquid token; never rescuable
    liquid_token: Address,
    /// Locked-token balances
    pub(crate) ledger: TokenLedger,
    total_burned: Amount,
    convert_burned: Amount,
    exit_forfeited: Amount,
    /// Accounts allowed to send without restriction
    pub(crate) exempt: BTreeSet<Address>,
    /// Accounts allowed to receive unconditionally
    pub(crate) exempt_to: BTreeSet<Address>,
    pub(crate) paused: bool,
    last_distributed_period: PeriodIndex,
}

impl ConversionToken {
    pub fn new(
        config: ConversionConfig,
        address: Address,
        operator: Address,
        emission_controller: Address,
        liquid_token: Address,
    ) -> Self {
        Self {
            config,
            address,
            operator,
            emission_controller,
            liquid_token,
            ledger: TokenLedger::new(),
            total_burned: Amount::zero(),
            convert_burned: Amount::zero(),
            exit_forfeited: Amount::zero(),
            exempt: BTreeSet::new(),
            exempt_to: BTreeSet::new(),
            paused: false,
            last_distributed_period: 0,
        }
    }

    /// Penalty on `amount`, rounded up. The minimum effective slashing rate
    /// is never below the configured rate.
    pub fn penalty(&self, amount: &Amount) -> Amount {
        amount
            .mul_div_ceil(
                &Amount::from_u64(self.config.penalty_numerator),
                &Amount::from_u64(self.config.penalty_basis),
            )
            .unwrap_or_else(Amount::zero)
    }

    /// Convert `amount` liquid tokens into locked tokens at full face value,
    /// burning the penalty out of the pulled backing. Returns the penalty.
    pub fn convert_emissions_token(
        &mut self,
        caller: Address,
        liquid: &mut TokenLedger,
        amount: &Amount,
    ) -> ConversionResult<Amount> {
        self.ensure_not_paused()?;
        if amount.is_zero() {
            return Err(ConversionError::ZeroAmount);
        }

        liquid.transfer_from(&self.address, &caller, &self.address, amount)?;

        let penalty = self.penalty(amount);
        liquid.burn(&self.address, &penalty)?;
        self.total_burned = self.total_burned.clone() + penalty.clone();
        self.convert_burned = self.convert_burned.clone() + penalty.clone();

        // Full face value: the caller's locked balance is not slashed
        self.ledger.mint(&caller, amount);

        tracing::debug!(caller = %caller, amount = %amount, penalty = %penalty, "converted");
        Ok(penalty)
    }

    /// Burn `amount` locked tokens and redeem the post-penalty remainder,
    /// clamped to the liquid reserve. Returns the amount paid out.
    pub fn exit(
        &mut self,
        caller: Address,
        liquid: &mut TokenLedger,
        amount: &Amount,
    ) -> ConversionResult<Amount> {
        self.ensure_not_paused()?;
        if amount.is_zero() {
            return Err(ConversionError::ZeroAmount);
        }

        let penalty = self.penalty(amount);
        // penalty <= amount at any rate <= 100%
        let after_penalty = amount.saturating_sub(&penalty);
        let reserve = liquid.balance_of(&self.address);
        let redeemable = if after_penalty < reserve {
            after_penalty
        } else {
            reserve
        };

        self.ledger.burn(&caller, amount)?;
        liquid.transfer(&self.address, &caller, &redeemable)?;
        self.exit_forfeited =
            self.exit_forfeited.clone() + amount.clone().saturating_sub(&redeemable);

        tracing::debug!(caller = %caller, amount = %amount, redeemed = %redeemable, "exited");
        Ok(redeemable)
    }

    /// Period stamp refresh driven by the emission controller. Kept for
    /// interface compatibility with the voting deposit; no value moves.
    pub fn rebase(
        &mut self,
        caller: Address,
        deposit: &mut dyn VotingDeposit,
        now: Timestamp,
    ) -> ConversionResult<()> {
        if caller != self.emission_controller {
            return Err(ConversionError::NotEmissionController);
        }
        self.ensure_not_paused()?;

        let current = period_of(now);
        if current > self.last_distributed_period {
            self.last_distributed_period = current;
            deposit.notify_reward_amount(&Amount::zero())?;
        }
        Ok(())
    }

    /// Move trapped third-party tokens out of the token's account. The
    /// underlying liquid token is never rescuable.
    pub fn rescue_trapped_tokens(
        &mut self,
        caller: Address,
        token: Address,
        token_ledger: &mut TokenLedger,
        to: Address,
        amount: &Amount,
    ) -> ConversionResult<()> {
        self.ensure_operator(caller)?;
        if token == self.liquid_token {
            return Err(ConversionError::CannotRescueUnderlying);
        }
        token_ledger.transfer(&self.address, &to, amount)?;
        Ok(())
    }

    pub fn migrate_operator(&mut self, caller: Address, new_operator: Address) -> ConversionResult<()> {
        self.ensure_operator(caller)?;
        if new_operator == self.operator {
            return Err(ConversionError::NoChange);
        }
        tracing::info!(from = %self.operator, to = %new_operator, "operator migrated");
        self.operator = new_operator;
        Ok(())
    }

    pub fn pause(&mut self, caller: Address) -> ConversionResult<()> {
        self.ensure_operator(caller)?;
        if self.paused {
            return Err(ConversionError::NoChange);
        }
        self.paused = true;
        tracing::warn!("conversion token paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> ConversionResult<()> {
        self.ensure_operator(caller)?;
        if !self.paused {
            return Err(ConversionError::NoChange);
        }
        self.paused = false;
        tracing::info!("conversion token unpaused");
        Ok(())
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> &Amount {
        self.ledger.total_supply()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    pub fn total_burned(&self) -> &Amount {
        &self.total_burned
    }

    pub fn burn_breakdown(&self) -> PenaltyBreakdown {
        PenaltyBreakdown {
            total_burned: self.total_burned.clone(),
            convert_burned: self.convert_burned.clone(),
            exit_forfeited: self.exit_forfeited.clone(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn last_distributed_period(&self) -> PeriodIndex {
        self.last_distributed_period
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn liquid_token(&self) -> Address {
        self.liquid_token
    }

    /// Raw handle to the locked-token ledger for boundary collaborators
    /// (voting deposit moves), which operate below the transfer restriction.
    pub fn ledger_mut(&mut self) -> &mut TokenLedger {
        &mut self.ledger
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub(crate) fn ensure_operator(&self, caller: Address) -> ConversionResult<()> {
        if caller != self.operator {
            return Err(ConversionError::NotOperator);
        }
        Ok(())
    }

    pub(crate) fn ensure_not_paused(&self) -> ConversionResult<()> {
        if self.paused {
            return Err(ConversionError::Paused);
        }
        Ok(())
    }
}

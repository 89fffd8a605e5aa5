// vault/src/incentives.rs
//
// Operator-driven yield handling: compounding accrued liquid tokens through
// the conversion penalty, routing incentive tokens through whitelisted
// aggregators, rescuing strays, and delegating votes/claims to the voting
// module. Every untrusted call is bracketed by snapshot/assert pairs; the
// share price must never decrease here.

use crate::vault::CompoundingVault;
use crate::{VaultError, VaultResult};
use conversion::ConversionToken;
use protocol_core::{
    period_of, Address, Aggregator, Amount, LpProbe, Timestamp, TokenLedger, VotingDeposit,
    VotingModule, BPS_BASIS,
};
use serde::{Deserialize, Serialize};

/// Parameters for an aggregator-routed incentive swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapParams {
    /// Pre-approved venue to call
    pub aggregator: Address,
    /// Incentive token being routed; never the vault's backing asset
    pub token_in: Address,
    /// Minimum liquid-token output the vault must observe
    pub min_amount_out: Amount,
    /// Opaque calldata handed to the venue
    pub payload: Vec<u8>,
}

/// One executed incentive swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub aggregator: Address,
    pub token_in: Address,
    /// Liquid tokens actually received
    pub amount_out: Amount,
}

/// One rescue, annotated with LP-pair components when the probe recognizes
/// the rescued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueRecord {
    pub token: Address,
    pub amount: Amount,
    pub lp_components: Option<(Address, Address)>,
}

/// Heuristic LP detection: a failed probe means "not an LP token", the one
/// tolerated failure path in the engine.
pub fn unwrap_lp(probe: &dyn LpProbe, token: &Address) -> Option<(Address, Address)> {
    probe.lp_components(token).ok()
}

impl CompoundingVault {
    /// Convert the vault's raw liquid balance into locked tokens (absorbing
    /// the conversion penalty) and stake the proceeds. Never fails on a flat
    /// price or an empty balance; both ratios are recorded for audit.
    pub fn compound(
        &mut self,
        caller: Address,
        liquid: &mut TokenLedger,
        locked: &mut ConversionToken,
        deposit: &mut dyn VotingDeposit,
        now: Timestamp,
    ) -> VaultResult<Amount> {
        self.ensure_operator(caller)?;

        let ratio_before = self.ratio(&*deposit);
        let balance = liquid.balance_of(&self.address);
        if !balance.is_zero() {
            liquid.approve(&self.address, &locked.address(), &balance);
            locked.convert_emissions_token(self.address, liquid, &balance)?;
            deposit.deposit(locked.ledger_mut(), self.address, &balance)?;
        }
        let ratio_after = self.ratio(&*deposit);

        self.compound_history.push(crate::CompoundRecord {
            period: period_of(now),
            compounded: balance.clone(),
            ratio_before: ratio_before.clone(),
            ratio_after: ratio_after.clone(),
        });
        tracing::info!(
            compounded = %balance,
            ratio_before = %ratio_before,
            ratio_after = %ratio_after,
            "compound executed"
        );
        Ok(balance)
    }

    /// Route an incentive token through a whitelisted venue. The call is
    /// untrusted: the liquid balance must grow by at least `min_amount_out`
    /// and `total_assets()` must be bit-for-bit unchanged afterwards.
    pub fn swap_incentive_via_aggregator(
        &mut self,
        caller: Address,
        params: &SwapParams,
        aggregator: &mut dyn Aggregator,
        liquid: &mut TokenLedger,
        locked: &mut ConversionToken,
        deposit: &mut dyn VotingDeposit,
    ) -> VaultResult<Amount> {
        self.ensure_operator(caller)?;
        if self.entered {
            return Err(VaultError::Reentrancy);
        }
        self.entered = true;
        let result = self.swap_inner(params, aggregator, liquid, locked, deposit);
        self.entered = false;
        result
    }

    fn swap_inner(
        &mut self,
        params: &SwapParams,
        aggregator: &mut dyn Aggregator,
        liquid: &mut TokenLedger,
        locked: &mut ConversionToken,
        deposit: &mut dyn VotingDeposit,
    ) -> VaultResult<Amount> {
        if !self.aggregators.contains(&params.aggregator) {
            return Err(VaultError::AggregatorNotWhitelisted);
        }
        if params.token_in == self.locked_token {
            return Err(VaultError::ForbiddenToken);
        }

        let assets_before = self.total_assets(&*deposit);
        let liquid_before = liquid.balance_of(&self.address);

        aggregator
            .execute(&params.payload, liquid, locked.ledger_mut(), deposit)
            .map_err(|e| VaultError::AggregatorCallFailed(e.0))?;

        let received = liquid.balance_of(&self.address).saturating_sub(&liquid_before);
        if received < params.min_amount_out {
            return Err(VaultError::AmountOutTooLow {
                min_out: params.min_amount_out.clone(),
                actual: received,
            });
        }
        // Any drift in either direction means the venue touched the
        // vault's staked collateral
        if self.total_assets(&*deposit) != assets_before {
            return Err(VaultError::ForbiddenToken);
        }

        self.swap_history.push(SwapRecord {
            aggregator: params.aggregator,
            token_in: params.token_in,
            amount_out: received.clone(),
        });
        tracing::info!(
            aggregator = %params.aggregator,
            token_in = %params.token_in,
            amount_out = %received,
            "incentive swap executed"
        );
        Ok(received)
    }

    /// Move trapped third-party tokens out of the vault's account. Reasserts
    /// that `total_assets()` has not decreased.
    pub fn rescue(
        &mut self,
        caller: Address,
        token: Address,
        token_ledger: &mut TokenLedger,
        to: Address,
        amount: &Amount,
        deposit: &dyn VotingDeposit,
        probe: &dyn LpProbe,
    ) -> VaultResult<()> {
        self.ensure_access_hub(caller)?;
        if self.entered {
            return Err(VaultError::Reentrancy);
        }
        self.entered = true;
        let result = self.rescue_inner(token, token_ledger, to, amount, deposit, probe);
        self.entered = false;
        result
    }

    fn rescue_inner(
        &mut self,
        token: Address,
        token_ledger: &mut TokenLedger,
        to: Address,
        amount: &Amount,
        deposit: &dyn VotingDeposit,
        probe: &dyn LpProbe,
    ) -> VaultResult<()> {
        let assets_before = self.total_assets(deposit);
        token_ledger.transfer(&self.address, &to, amount)?;
        if self.total_assets(deposit) < assets_before {
            return Err(VaultError::ForbiddenToken);
        }

        let lp_components = unwrap_lp(probe, &token);
        self.rescue_history.push(RescueRecord {
            token,
            amount: amount.clone(),
            lp_components,
        });
        Ok(())
    }

    /// Delegate gauge votes. The weight total may not exceed the basis.
    pub fn submit_votes(
        &mut self,
        caller: Address,
        voter: &mut dyn VotingModule,
        pools: &[Address],
        weights: &[u64],
    ) -> VaultResult<()> {
        self.ensure_operator(caller)?;
        if pools.len() != weights.len() {
            return Err(VaultError::ArrayLengthMismatch {
                left: pools.len(),
                right: weights.len(),
            });
        }
        let total: u128 = weights.iter().map(|w| *w as u128).sum();
        if total > BPS_BASIS as u128 {
            return Err(VaultError::WeightsExceedBasis { total });
        }
        voter.vote(self.address, pools, weights)?;
        Ok(())
    }

    /// Delegate incentive claims.
    pub fn claim_incentives(
        &mut self,
        caller: Address,
        voter: &mut dyn VotingModule,
        distributors: &[Address],
        tokens: &[Vec<Address>],
    ) -> VaultResult<()> {
        self.ensure_operator(caller)?;
        voter.claim_incentives(self.address, distributors, tokens)?;
        Ok(())
    }

    /// Manage the pre-approved venue set.
    pub fn whitelist_aggregator(
        &mut self,
        caller: Address,
        aggregator: Address,
        enabled: bool,
    ) -> VaultResult<()> {
        self.ensure_access_hub(caller)?;
        if enabled {
            self.aggregators.insert(aggregator);
        } else {
            self.aggregators.remove(&aggregator);
        }
        tracing::info!(aggregator = %aggregator, enabled, "aggregator whitelist updated");
        Ok(())
    }

    pub fn swap_history(&self) -> &[SwapRecord] {
        &self.swap_history
    }

    pub fn rescue_history(&self) -> &[RescueRecord] {
        &self.rescue_history
    }
}

// emissions/src/controller.rs

use crate::{EmissionsError, EmissionsResult};
use protocol_core::{
    epoch_of, period_of, period_start_utc, Address, Amount, PeriodIndex, Timestamp, TokenLedger,
    VotingModule, BPS_BASIS,
};
use serde::{Deserialize, Serialize};

/// Emission configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionConfig {
    /// Hard cap on liquid-token supply
    pub max_supply: Amount,
    /// Number of initial epochs with the relaxed adjustment bound
    pub early_epochs: u64,
    /// Adjustment bound during the early epochs (basis points)
    pub early_adjust_bound_bps: i64,
    /// Adjustment bound afterwards (basis points)
    pub adjust_bound_bps: i64,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            max_supply: Amount::from_tokens(50_000_000),
            early_epochs: 3,
            early_adjust_bound_bps: 10_000, // ±100% while calibrating
            adjust_bound_bps: 2_500,        // ±25% once stabilized
        }
    }
}

/// One period rollover, as recorded by `update_period`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    /// Period that was activated
    pub period: PeriodIndex,
    /// Amount minted for the period (zero at the supply cap)
    pub minted: Amount,
    /// Multiplier in effect (basis points)
    pub multiplier_bps: u64,
    /// Weekly emission carried into the next period
    pub weekly_emissions: Amount,
}

/// Controller owning the weekly mint schedule and the adaptive multiplier.
///
/// Lifecycle: constructed with its roles, armed once via `kickoff`, started
/// once via `init_epoch_zero`, then driven by permissionless `update_period`
/// calls and at most one governance `adjust_emissions` per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionController {
    /// Configuration
    config: EmissionConfig,
    /// Controller's own ledger account (holds freshly minted emissions)
    address: Address,
    /// Role allowed to run the one-time lifecycle operations
    operator: Address,
    /// Role allowed to adjust the multiplier
    governor: Address,
    /// Liquid-token reference (set at kickoff)
    token: Option<Address>,
    /// Distribution-module reference (set at kickoff)
    distributor: Option<Address>,
    /// Locked-token reference (set at kickoff)
    locked_token: Option<Address>,
    /// Emission for the active period, token units
    weekly_emissions: Amount,
    /// Multiplier applied to compute the next period's emission (basis points)
    emissions_multiplier: u64,
    /// Period of `init_epoch_zero`; zero until started
    first_period: PeriodIndex,
    /// Most recent period activated by `update_period`
    active_period: PeriodIndex,
    /// Period of the last multiplier adjustment
    last_multiplier_update: PeriodIndex,
    /// Append-only rollover log
    history: Vec<EmissionRecord>,
}

impl EmissionController {
    pub fn new(config: EmissionConfig, address: Address, operator: Address, governor: Address) -> Self {
        Self {
            config,
            address,
            operator,
            governor,
            token: None,
            distributor: None,
            locked_token: None,
            weekly_emissions: Amount::zero(),
            emissions_multiplier: BPS_BASIS,
            first_period: 0,
            active_period: 0,
            last_multiplier_update: 0,
            history: Vec::new(),
        }
    }

    /// One-time arming: fixes the collaborator references and mints the
    /// bootstrap distribution to the operator.
    pub fn kickoff(
        &mut self,
        caller: Address,
        liquid: &mut TokenLedger,
        token: Address,
        distributor: Address,
        locked_token: Address,
        initial_weekly_emissions: Amount,
        initial_multiplier_bps: u64,
    ) -> EmissionsResult<()> {
        if caller != self.operator {
            return Err(EmissionsError::NotOperator);
        }
        if self.token.is_some() {
            return Err(EmissionsError::AlreadyStarted);
        }
        if token.is_zero() || distributor.is_zero() || locked_token.is_zero() {
            return Err(EmissionsError::InvalidReference);
        }
        if initial_multiplier_bps == 0 {
            return Err(EmissionsError::WouldZeroMultiplier);
        }

        self.token = Some(token);
        self.distributor = Some(distributor);
        self.locked_token = Some(locked_token);
        self.weekly_emissions = initial_weekly_emissions.clone();
        self.emissions_multiplier = initial_multiplier_bps;

        liquid.mint(&self.operator, &initial_weekly_emissions);
        tracing::info!(
            bootstrap = %initial_weekly_emissions,
            multiplier_bps = initial_multiplier_bps,
            "emissions kicked off"
        );
        Ok(())
    }

    /// One-time start of the schedule: anchors the first period and mints the
    /// first week's emission to the operator for manual seeding.
    pub fn init_epoch_zero(
        &mut self,
        caller: Address,
        liquid: &mut TokenLedger,
        now: Timestamp,
    ) -> EmissionsResult<()> {
        if caller != self.operator {
            return Err(EmissionsError::NotOperator);
        }
        if self.token.is_none() {
            return Err(EmissionsError::EmissionsNotStarted);
        }
        if self.first_period != 0 {
            return Err(EmissionsError::AlreadyStarted);
        }

        let current = period_of(now);
        self.first_period = current;
        self.active_period = current;
        // One adjustment is allowed immediately after launch
        self.last_multiplier_update = current.saturating_sub(1);

        liquid.mint(&self.operator, &self.weekly_emissions);
        tracing::info!(period = current, seeded = %self.weekly_emissions, "epoch zero initialized");
        Ok(())
    }

    /// Advance the schedule. Idempotent within a period; on rollover mints
    /// the clamped weekly emission to the controller, grants the distributor
    /// a matching allowance, and notifies it. Returns the minted amount.
    pub fn update_period(
        &mut self,
        liquid: &mut TokenLedger,
        voter: &mut dyn VotingModule,
        now: Timestamp,
    ) -> EmissionsResult<Amount> {
        if self.first_period == 0 {
            return Err(EmissionsError::EmissionsNotStarted);
        }
        let current = period_of(now);
        if current <= self.active_period {
            return Ok(Amount::zero());
        }
        let distributor = self.distributor.ok_or(EmissionsError::EmissionsNotStarted)?;

        let emissions = self.calculate_weekly_emissions(liquid);
        if !emissions.is_zero() {
            liquid.mint(&self.address, &emissions);
            liquid.approve(&self.address, &distributor, &emissions);
            voter.notify_reward_amount(liquid, self.address, &emissions)?;
        }

        self.active_period = current;
        self.weekly_emissions = emissions.clone();
        self.history.push(EmissionRecord {
            period: current,
            minted: emissions.clone(),
            multiplier_bps: self.emissions_multiplier,
            weekly_emissions: self.weekly_emissions.clone(),
        });
        tracing::info!(
            period = current,
            starts = ?period_start_utc(current),
            minted = %emissions,
            multiplier_bps = self.emissions_multiplier,
            "period advanced"
        );
        Ok(emissions)
    }

    /// Governance adjustment of the multiplier, at most once per period.
    pub fn adjust_emissions(
        &mut self,
        caller: Address,
        delta_bps: i64,
        now: Timestamp,
    ) -> EmissionsResult<()> {
        if caller != self.governor {
            return Err(EmissionsError::NotGovernor);
        }
        if self.first_period == 0 {
            return Err(EmissionsError::EmissionsNotStarted);
        }
        if self.last_multiplier_update >= self.active_period {
            return Err(EmissionsError::SamePeriod);
        }
        if delta_bps == 0 {
            return Err(EmissionsError::NoChange);
        }

        let epoch = epoch_of(now, self.first_period);
        let bound = if epoch < self.config.early_epochs {
            self.config.early_adjust_bound_bps
        } else {
            self.config.adjust_bound_bps
        };
        if delta_bps.abs() > bound {
            return Err(EmissionsError::OutOfBounds { delta_bps, bound_bps: bound });
        }

        // floor(multiplier * (basis + delta) / basis); operands are
        // non-negative because |delta| <= basis
        let factor = BPS_BASIS as i128 + delta_bps as i128;
        let adjusted = (self.emissions_multiplier as i128 * factor / BPS_BASIS as i128) as u64;
        if adjusted == 0 {
            return Err(EmissionsError::WouldZeroMultiplier);
        }

        tracing::info!(
            from_bps = self.emissions_multiplier,
            to_bps = adjusted,
            epoch,
            "emission multiplier adjusted"
        );
        self.emissions_multiplier = adjusted;
        self.last_multiplier_update = self.active_period;
        Ok(())
    }

    /// Clamped emission for the next rollover, side-effect free.
    pub fn calculate_weekly_emissions(&self, liquid: &TokenLedger) -> Amount {
        let base = self
            .weekly_emissions
            .mul_div_floor(
                &Amount::from_u64(self.emissions_multiplier),
                &Amount::from_u64(BPS_BASIS),
            )
            .unwrap_or_else(Amount::zero);
        let headroom = self.config.max_supply.saturating_sub(liquid.total_supply());
        if base < headroom {
            base
        } else {
            headroom
        }
    }

    pub fn get_period(&self, now: Timestamp) -> PeriodIndex {
        period_of(now)
    }

    pub fn get_epoch(&self, now: Timestamp) -> u64 {
        epoch_of(now, self.first_period)
    }

    pub fn weekly_emissions(&self) -> &Amount {
        &self.weekly_emissions
    }

    pub fn emissions_multiplier(&self) -> u64 {
        self.emissions_multiplier
    }

    pub fn first_period(&self) -> PeriodIndex {
        self.first_period
    }

    pub fn active_period(&self) -> PeriodIndex {
        self.active_period
    }

    pub fn last_multiplier_update(&self) -> PeriodIndex {
        self.last_multiplier_update
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token(&self) -> Option<Address> {
        self.token
    }

    pub fn distributor(&self) -> Option<Address> {
        self.distributor
    }

    pub fn locked_token(&self) -> Option<Address> {
        self.locked_token
    }

    pub fn history(&self) -> &[EmissionRecord] {
        &self.history
    }

    pub fn config(&self) -> &EmissionConfig {
        &self.config
    }
}

// vault/src/vault.rs

use crate::{VaultError, VaultResult};
use conversion::ConversionToken;
use protocol_core::{
    in_final_hour, period_of, Address, Amount, PeriodIndex, Timestamp, TokenLedger, VotingDeposit,
    VotingModule,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Fixed-point scale for the share price: 10^18 = 1.0
pub const RATIO_SCALE: u64 = 1_000_000_000_000_000_000;

/// One compound execution, with the share price on both sides for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub period: PeriodIndex,
    /// Liquid yield converted and re-staked
    pub compounded: Amount,
    pub ratio_before: Amount,
    pub ratio_after: Amount,
}

/// Share ledger over locked tokens held through the voting deposit.
///
/// The share price is non-decreasing across operator-triggered compounds and
/// aggregator swaps; this is enforced by snapshot/assert pairs around every
/// untrusted call rather than by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundingVault {
    /// Vault's own ledger account
    pub(crate) address: Address,
    pub(crate) operator: Address,
    pub(crate) access_hub: Address,
    /// The backing asset: the locked (conversion) token
    pub(crate) locked_token: Address,
    /// Share balances
    pub(crate) shares: TokenLedger,
    /// Per-period deposit windows; set once by the operator, never reset
    period_unlock: HashMap<PeriodIndex, bool>,
    /// Pre-approved swap venues
    pub(crate) aggregators: BTreeSet<Address>,
    /// Reentrancy guard for operations that call out mid-flight
    pub(crate) entered: bool,
    pub(crate) compound_history: Vec<CompoundRecord>,
    pub(crate) swap_history: Vec<crate::SwapRecord>,
    pub(crate) rescue_history: Vec<crate::RescueRecord>,
}

impl CompoundingVault {
    pub fn new(address: Address, operator: Address, access_hub: Address, locked_token: Address) -> Self {
        Self {
            address,
            operator,
            access_hub,
            locked_token,
            shares: TokenLedger::new(),
            period_unlock: HashMap::new(),
            aggregators: BTreeSet::new(),
            entered: false,
            compound_history: Vec::new(),
            swap_history: Vec::new(),
            rescue_history: Vec::new(),
        }
    }

    /// Locked tokens held on the vault's behalf by the voting deposit.
    pub fn total_assets(&self, deposit: &dyn VotingDeposit) -> Amount {
        deposit.balance_of(&self.address)
    }

    /// Share price scaled by 10^18; 10^18 on an empty vault.
    pub fn ratio(&self, deposit: &dyn VotingDeposit) -> Amount {
        let supply = self.shares.total_supply();
        if supply.is_zero() {
            return Amount::from_u64(RATIO_SCALE);
        }
        self.total_assets(deposit)
            .mul_div_floor(&Amount::from_u64(RATIO_SCALE), supply)
            .unwrap_or_else(Amount::zero)
    }

    /// Shares minted for a deposit of `assets`, rounded down.
    pub fn convert_to_shares(&self, assets: &Amount, deposit: &dyn VotingDeposit) -> Amount {
        let supply = self.shares.total_supply();
        let total = self.total_assets(deposit);
        if supply.is_zero() || total.is_zero() {
            return assets.clone();
        }
        assets.mul_div_floor(supply, &total).unwrap_or_else(Amount::zero)
    }

    /// Assets redeemed for `shares`, rounded down.
    pub fn convert_to_assets(&self, shares: &Amount, deposit: &dyn VotingDeposit) -> Amount {
        let supply = self.shares.total_supply();
        if supply.is_zero() {
            return shares.clone();
        }
        shares
            .mul_div_floor(&self.total_assets(deposit), supply)
            .unwrap_or_else(Amount::zero)
    }

    /// Whether deposits are open right now. Unconditionally false during the
    /// final hour of every period; otherwise the operator-set flag.
    pub fn is_unlocked(&self, now: Timestamp) -> bool {
        if in_final_hour(now) {
            return false;
        }
        self.period_unlock.get(&period_of(now)).copied().unwrap_or(false)
    }

    /// Open the current period's deposit window. Each period needs its own
    /// explicit unlock; the flag is never reset.
    pub fn unlock(
        &mut self,
        caller: Address,
        deposit: &dyn VotingDeposit,
        now: Timestamp,
    ) -> VaultResult<()> {
        self.ensure_operator(caller)?;
        if deposit.unlock_time() > now {
            return Err(VaultError::Locked);
        }
        let period = period_of(now);
        self.period_unlock.insert(period, true);
        tracing::info!(period, "vault unlocked for deposits");
        Ok(())
    }

    pub fn period_unlocked(&self, period: PeriodIndex) -> bool {
        self.period_unlock.get(&period).copied().unwrap_or(false)
    }

    /// Deposit `assets` locked tokens and mint proportional shares.
    pub fn deposit(
        &mut self,
        caller: Address,
        assets: &Amount,
        locked: &mut ConversionToken,
        deposit: &mut dyn VotingDeposit,
        voter: &dyn VotingModule,
        now: Timestamp,
    ) -> VaultResult<Amount> {
        if !self.is_unlocked(now) {
            return Err(VaultError::Locked);
        }
        let shares = self.convert_to_shares(assets, deposit);
        if shares.is_zero() {
            return Err(VaultError::ZeroShares);
        }

        locked.transfer_from(self.address, caller, self.address, assets, voter)?;
        deposit.deposit(locked.ledger_mut(), self.address, assets)?;
        self.shares.mint(&caller, &shares);

        tracing::debug!(caller = %caller, assets = %assets, shares = %shares, "deposit");
        Ok(shares)
    }

    /// Mint exactly `shares`, pulling the rounded-up asset cost.
    pub fn mint_shares(
        &mut self,
        caller: Address,
        shares: &Amount,
        locked: &mut ConversionToken,
        deposit: &mut dyn VotingDeposit,
        voter: &dyn VotingModule,
        now: Timestamp,
    ) -> VaultResult<Amount> {
        if !self.is_unlocked(now) {
            return Err(VaultError::Locked);
        }
        if shares.is_zero() {
            return Err(VaultError::ZeroShares);
        }
        let supply = self.shares.total_supply();
        let assets = if supply.is_zero() {
            shares.clone()
        } else {
            shares
                .mul_div_ceil(&self.total_assets(deposit), supply)
                .unwrap_or_else(Amount::zero)
        };

        locked.transfer_from(self.address, caller, self.address, &assets, voter)?;
        deposit.deposit(locked.ledger_mut(), self.address, &assets)?;
        self.shares.mint(&caller, shares);

        Ok(assets)
    }

    /// Withdraw exactly `assets`, burning the rounded-up share cost. Never
    /// gated: liquidity exit is always permitted regardless of lock state.
    pub fn withdraw(
        &mut self,
        caller: Address,
        assets: &Amount,
        locked: &mut ConversionToken,
        deposit: &mut dyn VotingDeposit,
        voter: &dyn VotingModule,
    ) -> VaultResult<Amount> {
        let supply = self.shares.total_supply();
        let shares = if supply.is_zero() {
            assets.clone()
        } else {
            assets
                .mul_div_ceil(supply, &self.total_assets(deposit))
                .ok_or(VaultError::ZeroShares)?
        };
        if shares.is_zero() {
            return Err(VaultError::ZeroShares);
        }

        self.shares.burn(&caller, &shares)?;
        deposit.withdraw(locked.ledger_mut(), self.address, self.address, assets)?;
        locked.transfer(self.address, caller, assets, voter)?;

        tracing::debug!(caller = %caller, assets = %assets, shares = %shares, "withdraw");
        Ok(shares)
    }

    /// Redeem `shares` for the rounded-down asset payout. Never gated.
    pub fn redeem(
        &mut self,
        caller: Address,
        shares: &Amount,
        locked: &mut ConversionToken,
        deposit: &mut dyn VotingDeposit,
        voter: &dyn VotingModule,
    ) -> VaultResult<Amount> {
        if shares.is_zero() {
            return Err(VaultError::ZeroShares);
        }
        let assets = self.convert_to_assets(shares, deposit);

        self.shares.burn(&caller, shares)?;
        deposit.withdraw(locked.ledger_mut(), self.address, self.address, &assets)?;
        locked.transfer(self.address, caller, &assets, voter)?;

        Ok(assets)
    }

    pub fn share_balance_of(&self, account: &Address) -> Amount {
        self.shares.balance_of(account)
    }

    pub fn total_shares(&self) -> &Amount {
        self.shares.total_supply()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn locked_token(&self) -> Address {
        self.locked_token
    }

    pub fn is_aggregator_whitelisted(&self, aggregator: &Address) -> bool {
        self.aggregators.contains(aggregator)
    }

    pub fn compound_history(&self) -> &[CompoundRecord] {
        &self.compound_history
    }

    pub(crate) fn ensure_operator(&self, caller: Address) -> VaultResult<()> {
        if caller != self.operator {
            return Err(VaultError::NotOperator);
        }
        Ok(())
    }

    pub(crate) fn ensure_access_hub(&self, caller: Address) -> VaultResult<()> {
        if caller != self.access_hub {
            return Err(VaultError::NotAccessHub);
        }
        Ok(())
    }
}

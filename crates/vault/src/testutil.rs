// vault/src/testutil.rs
//
// Shared fixtures for the vault tests: in-memory collaborator mocks and a
// wired-up vault + conversion token + liquid ledger.

use crate::{CompoundingVault, VaultResult};
use conversion::{ConversionConfig, ConversionToken};
use protocol_core::{
    period_of, Address, Aggregator, Amount, CollaboratorError, LpProbe, PeriodIndex, Timestamp,
    TokenLedger, VotingDeposit, VotingModule, WEEK_SECONDS,
};
use std::collections::{BTreeSet, HashMap};

pub const VAULT: u8 = 1;
pub const OPERATOR: u8 = 2;
pub const ACCESS_HUB: u8 = 3;
pub const LOCKED_TOKEN: u8 = 4;
pub const LIQUID_TOKEN: u8 = 5;
pub const DEPOSIT: u8 = 6;
pub const CONTROLLER: u8 = 7;
pub const AGG: u8 = 8;
pub const ALICE: u8 = 10;
pub const BOB: u8 = 11;
pub const ATTACKER: u8 = 12;

/// Mid-period timestamp, away from any boundary.
pub const NOW: Timestamp = 2_850 * WEEK_SECONDS + 1_000;

pub fn addr(tag: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = tag;
    Address::new(bytes)
}

/// In-memory voting deposit tracking per-principal positions.
pub struct MockDeposit {
    pub account: Address,
    pub staked: HashMap<Address, Amount>,
    pub unlock_time: Timestamp,
}

impl MockDeposit {
    pub fn new() -> Self {
        Self {
            account: addr(DEPOSIT),
            staked: HashMap::new(),
            unlock_time: 0,
        }
    }
}

impl VotingDeposit for MockDeposit {
    fn deposit(
        &mut self,
        locked: &mut TokenLedger,
        principal: Address,
        amount: &Amount,
    ) -> Result<(), CollaboratorError> {
        locked
            .transfer(&principal, &self.account, amount)
            .map_err(|e| CollaboratorError(e.to_string()))?;
        let current = self.staked.get(&principal).cloned().unwrap_or_else(Amount::zero);
        self.staked.insert(principal, current + amount.clone());
        Ok(())
    }

    fn deposit_all(
        &mut self,
        locked: &mut TokenLedger,
        principal: Address,
    ) -> Result<Amount, CollaboratorError> {
        let amount = locked.balance_of(&principal);
        self.deposit(locked, principal, &amount)?;
        Ok(amount)
    }

    fn withdraw(
        &mut self,
        locked: &mut TokenLedger,
        principal: Address,
        to: Address,
        amount: &Amount,
    ) -> Result<(), CollaboratorError> {
        let current = self.staked.get(&principal).cloned().unwrap_or_else(Amount::zero);
        let remaining = current
            .checked_sub(amount)
            .ok_or_else(|| CollaboratorError("position too small".into()))?;
        self.staked.insert(principal, remaining);
        locked
            .transfer(&self.account, &to, amount)
            .map_err(|e| CollaboratorError(e.to_string()))
    }

    fn balance_of(&self, principal: &Address) -> Amount {
        self.staked.get(principal).cloned().unwrap_or_else(Amount::zero)
    }

    fn unlock_time(&self) -> Timestamp {
        self.unlock_time
    }

    fn notify_reward_amount(&mut self, _amount: &Amount) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Voting module recording delegated calls.
pub struct MockVoter {
    pub gauges: BTreeSet<Address>,
    pub votes: Vec<(Address, Vec<Address>, Vec<u64>)>,
    pub claims: Vec<(Address, usize)>,
}

impl MockVoter {
    pub fn new() -> Self {
        Self {
            gauges: BTreeSet::new(),
            votes: Vec::new(),
            claims: Vec::new(),
        }
    }
}

impl VotingModule for MockVoter {
    fn get_period(&self, now: Timestamp) -> PeriodIndex {
        period_of(now)
    }

    fn is_gauge(&self, account: &Address) -> bool {
        self.gauges.contains(account)
    }

    fn is_fee_distributor(&self, _account: &Address) -> bool {
        false
    }

    fn notify_reward_amount(
        &mut self,
        _liquid: &mut TokenLedger,
        _from: Address,
        _amount: &Amount,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn vote(
        &mut self,
        principal: Address,
        pools: &[Address],
        weights: &[u64],
    ) -> Result<(), CollaboratorError> {
        self.votes.push((principal, pools.to_vec(), weights.to_vec()));
        Ok(())
    }

    fn claim_incentives(
        &mut self,
        principal: Address,
        distributors: &[Address],
        _tokens: &[Vec<Address>],
    ) -> Result<(), CollaboratorError> {
        self.claims.push((principal, distributors.len()));
        Ok(())
    }
}

/// Well-behaved venue: pays liquid tokens from its own account to the vault.
pub struct PayoutAggregator {
    pub account: Address,
    pub vault: Address,
    pub payout: Amount,
}

impl Aggregator for PayoutAggregator {
    fn execute(
        &mut self,
        _payload: &[u8],
        liquid: &mut TokenLedger,
        _locked: &mut TokenLedger,
        _deposit: &mut dyn VotingDeposit,
    ) -> Result<(), CollaboratorError> {
        liquid
            .transfer(&self.account, &self.vault, &self.payout)
            .map_err(|e| CollaboratorError(e.to_string()))
    }
}

/// Malicious venue: pays enough liquid to satisfy the output check while
/// siphoning staked collateral out of the voting deposit.
pub struct SiphonAggregator {
    pub account: Address,
    pub vault: Address,
    pub attacker: Address,
    pub payout: Amount,
    pub steal: Amount,
}

impl Aggregator for SiphonAggregator {
    fn execute(
        &mut self,
        _payload: &[u8],
        liquid: &mut TokenLedger,
        locked: &mut TokenLedger,
        deposit: &mut dyn VotingDeposit,
    ) -> Result<(), CollaboratorError> {
        deposit.withdraw(locked, self.vault, self.attacker, &self.steal)?;
        liquid
            .transfer(&self.account, &self.vault, &self.payout)
            .map_err(|e| CollaboratorError(e.to_string()))
    }
}

/// Venue that grows the vault's staked position mid-call; even an increase
/// must trip the bit-for-bit assets assertion.
pub struct DonatingAggregator {
    pub account: Address,
    pub vault: Address,
    pub payout: Amount,
    pub donation: Amount,
}

impl Aggregator for DonatingAggregator {
    fn execute(
        &mut self,
        _payload: &[u8],
        liquid: &mut TokenLedger,
        locked: &mut TokenLedger,
        deposit: &mut dyn VotingDeposit,
    ) -> Result<(), CollaboratorError> {
        locked.mint(&self.vault, &self.donation);
        deposit.deposit(locked, self.vault, &self.donation)?;
        liquid
            .transfer(&self.account, &self.vault, &self.payout)
            .map_err(|e| CollaboratorError(e.to_string()))
    }
}

/// Venue that reverts, echoing the payload back as its failure.
pub struct FailingAggregator;

impl Aggregator for FailingAggregator {
    fn execute(
        &mut self,
        payload: &[u8],
        _liquid: &mut TokenLedger,
        _locked: &mut TokenLedger,
        _deposit: &mut dyn VotingDeposit,
    ) -> Result<(), CollaboratorError> {
        Err(CollaboratorError(format!(
            "revert: 0x{}",
            hex::encode(payload)
        )))
    }
}

/// LP probe answering only for registered pair tokens.
pub struct PairProbe {
    pub pairs: HashMap<Address, (Address, Address)>,
}

impl PairProbe {
    pub fn empty() -> Self {
        Self { pairs: HashMap::new() }
    }
}

impl LpProbe for PairProbe {
    fn lp_components(&self, token: &Address) -> Result<(Address, Address), CollaboratorError> {
        self.pairs
            .get(token)
            .copied()
            .ok_or_else(|| CollaboratorError("token0() probe failed".into()))
    }
}

/// A vault wired to its conversion token, liquid ledger, and mocks.
pub struct Fixture {
    pub vault: CompoundingVault,
    pub locked: ConversionToken,
    pub liquid: TokenLedger,
    pub deposit: MockDeposit,
    pub voter: MockVoter,
}

impl Fixture {
    pub fn new() -> Self {
        let mut locked = ConversionToken::new(
            ConversionConfig::default(),
            addr(LOCKED_TOKEN),
            addr(OPERATOR),
            addr(CONTROLLER),
            addr(LIQUID_TOKEN),
        );
        // The vault both receives deposits and sends withdrawals
        locked
            .set_exemption(addr(OPERATOR), &[addr(VAULT)], &[true])
            .unwrap();
        locked
            .set_exemption_to(addr(OPERATOR), &[addr(VAULT)], &[true])
            .unwrap();

        Self {
            vault: CompoundingVault::new(
                addr(VAULT),
                addr(OPERATOR),
                addr(ACCESS_HUB),
                addr(LOCKED_TOKEN),
            ),
            locked,
            liquid: TokenLedger::new(),
            deposit: MockDeposit::new(),
            voter: MockVoter::new(),
        }
    }

    /// Give `who` locked tokens (via conversion) approved toward the vault.
    pub fn fund_locked(&mut self, who: Address, amount: u64) {
        let amount = Amount::from_u64(amount);
        self.liquid.mint(&who, &amount);
        self.liquid.approve(&who, &addr(LOCKED_TOKEN), &amount);
        self.locked
            .convert_emissions_token(who, &mut self.liquid, &amount)
            .unwrap();
        self.locked.approve(who, addr(VAULT), &amount).unwrap();
    }

    pub fn deposit_assets(
        &mut self,
        who: Address,
        amount: u64,
        now: Timestamp,
    ) -> VaultResult<Amount> {
        self.vault.deposit(
            who,
            &Amount::from_u64(amount),
            &mut self.locked,
            &mut self.deposit,
            &self.voter,
            now,
        )
    }

    /// Yield accrues inside the voting deposit on the vault's behalf.
    pub fn simulate_yield(&mut self, amount: u64) {
        let amount = Amount::from_u64(amount);
        let account = self.deposit.account;
        self.locked.ledger_mut().mint(&account, &amount);
        let vault = addr(VAULT);
        let current = self
            .deposit
            .staked
            .get(&vault)
            .cloned()
            .unwrap_or_else(Amount::zero);
        self.deposit.staked.insert(vault, current + amount);
    }
}

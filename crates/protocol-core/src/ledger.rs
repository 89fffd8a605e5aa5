// protocol-core/src/ledger.rs

use crate::{Address, Amount, CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Generic fungible-token ledger: balances, allowances, total supply.
///
/// Two independent instances exist at runtime: the liquid emissions token and
/// the locked token (the latter wrapped by the conversion layer, which adds
/// the transfer restriction on top of these primitives).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    total_supply: Amount,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: Amount::zero(),
        }
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).cloned().unwrap_or_else(Amount::zero)
    }

    pub fn total_supply(&self) -> &Amount {
        &self.total_supply
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|per_spender| per_spender.get(spender))
            .cloned()
            .unwrap_or_else(Amount::zero)
    }

    /// Create `amount` new units on `to`. Supply grows by the same amount.
    pub fn mint(&mut self, to: &Address, amount: &Amount) {
        let balance = self.balance_of(to);
        self.balances.insert(*to, balance + amount.clone());
        self.total_supply = self.total_supply.clone() + amount.clone();
    }

    /// Destroy `amount` units held by `from`. Supply shrinks by the same amount.
    pub fn burn(&mut self, from: &Address, amount: &Amount) -> CoreResult<()> {
        let balance = self.balance_of(from);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(CoreError::InsufficientBalance)?;
        self.balances.insert(*from, remaining);
        // Supply underflow is impossible when the balance check passed
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(CoreError::InsufficientBalance)?;
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: &Amount) -> CoreResult<()> {
        let from_balance = self.balance_of(from);
        let remaining = from_balance
            .checked_sub(amount)
            .ok_or(CoreError::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self.balance_of(to);
        self.balances.insert(*from, remaining);
        self.balances.insert(*to, to_balance + amount.clone());
        Ok(())
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: &Amount) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount.clone());
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance unless the spender is the owner.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: &Amount,
    ) -> CoreResult<()> {
        if spender != from {
            let allowed = self.allowance(from, spender);
            let remaining = allowed
                .checked_sub(amount)
                .ok_or(CoreError::InsufficientAllowance)?;
            self.allowances
                .entry(*from)
                .or_default()
                .insert(*spender, remaining);
        }
        self.transfer(from, to, amount)
    }

    /// Deterministic digest over the sorted balance set and total supply,
    /// for cheap state-integrity checkpoints.
    pub fn digest(&self) -> [u8; 32] {
        let mut entries: Vec<(&Address, &Amount)> = self.balances.iter().collect();
        entries.sort_by_key(|(address, _)| *address);

        let mut hasher = Sha256::new();
        for (address, balance) in entries {
            hasher.update(address.as_bytes());
            let bytes = balance.inner().to_bytes_be();
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(&bytes);
        }
        hasher.update(self.total_supply.inner().to_bytes_be());
        hasher.finalize().into()
    }
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

// conversion/src/restrictions.rs
//
// Transfer restriction for the locked token. A balance move is allowed when
// the sender is exempt, the receiver accepts unconditionally, or the sender
// is a registered reward distributor, which is added to the exempt set
// inside the same atomic check. Mints (conversion) and burns (exit) act on
// the ledger directly and never reach this hook.

use crate::token::ConversionToken;
use crate::{ConversionError, ConversionResult};
use protocol_core::{Address, Amount, VotingModule};

impl ConversionToken {
    pub fn is_exempt(&self, account: &Address) -> bool {
        self.exempt.contains(account)
    }

    pub fn is_exempt_to(&self, account: &Address) -> bool {
        self.exempt_to.contains(account)
    }

    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: &Amount,
        voter: &dyn VotingModule,
    ) -> ConversionResult<()> {
        self.ensure_not_paused()?;
        self.check_transfer(caller, to, voter)?;
        self.ledger.transfer(&caller, &to, amount)?;
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: &Amount,
        voter: &dyn VotingModule,
    ) -> ConversionResult<()> {
        self.ensure_not_paused()?;
        self.check_transfer(from, to, voter)?;
        self.ledger.transfer_from(&caller, &from, &to, amount)?;
        Ok(())
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: &Amount) -> ConversionResult<()> {
        self.ensure_not_paused()?;
        self.ledger.approve(&caller, &spender, amount);
        Ok(())
    }

    /// Batch-update the unrestricted-sender set.
    pub fn set_exemption(
        &mut self,
        caller: Address,
        accounts: &[Address],
        statuses: &[bool],
    ) -> ConversionResult<()> {
        self.ensure_operator(caller)?;
        if accounts.len() != statuses.len() {
            return Err(ConversionError::ArrayLengthMismatch {
                left: accounts.len(),
                right: statuses.len(),
            });
        }
        for (account, status) in accounts.iter().zip(statuses) {
            if *status {
                self.exempt.insert(*account);
            } else {
                self.exempt.remove(account);
            }
        }
        Ok(())
    }

    /// Batch-update the unconditional-receiver set.
    pub fn set_exemption_to(
        &mut self,
        caller: Address,
        accounts: &[Address],
        statuses: &[bool],
    ) -> ConversionResult<()> {
        self.ensure_operator(caller)?;
        if accounts.len() != statuses.len() {
            return Err(ConversionError::ArrayLengthMismatch {
                left: accounts.len(),
                right: statuses.len(),
            });
        }
        for (account, status) in accounts.iter().zip(statuses) {
            if *status {
                self.exempt_to.insert(*account);
            } else {
                self.exempt_to.remove(account);
            }
        }
        Ok(())
    }

    fn check_transfer(
        &mut self,
        from: Address,
        to: Address,
        voter: &dyn VotingModule,
    ) -> ConversionResult<()> {
        if self.exempt.contains(&from) || self.exempt_to.contains(&to) {
            return Ok(());
        }
        if voter.is_gauge(&from) || voter.is_fee_distributor(&from) {
            // Reward distributors are whitelisted lazily, on first observed send
            self.exempt.insert(from);
            tracing::debug!(account = %from, "reward distributor auto-whitelisted");
            return Ok(());
        }
        Err(ConversionError::NotWhitelisted { from, to })
    }
}

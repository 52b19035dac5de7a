use crate::errors::{DexError, Result};
use crate::logic::math::{checked_add, checked_sub};
use crate::utils::FastHashMap;
use alloy_primitives::{Address, U256};

/// Standard fungible-token surface. `true`-returning operations of the usual
/// interface map to `Ok(())`; failures carry the reason instead of `false`.
pub trait FungibleToken {
    fn total_supply(&self) -> U256;
    fn balance_of(&self, owner: Address) -> U256;
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<()>;
    fn approve(&mut self, owner: Address, spender: Address, amount: U256) -> Result<()>;
    fn transfer_from(&mut self, spender: Address, from: Address, to: Address, amount: U256) -> Result<()>;
}

/// Balances, allowances and supply of one token. Used for both plain tokens
/// and pool shares.
#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    total_supply: U256,
    balances: FastHashMap<Address, U256>,
    allowances: FastHashMap<(Address, Address), U256>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> Result<()> {
        self.total_supply = checked_add(self.total_supply, amount)?;
        let balance = self.balances.entry(to).or_default();
        *balance = checked_add(*balance, amount)?;
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(DexError::ExceedsBalance);
        }
        self.balances.insert(from, balance - amount);
        self.total_supply = checked_sub(self.total_supply, amount)?;
        Ok(())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        if from.is_zero() || to.is_zero() {
            return Err(DexError::ZeroAddress);
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(DexError::ExceedsBalance);
        }
        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balances.entry(to).or_default();
        *to_balance = checked_add(*to_balance, amount)?;
        Ok(())
    }
}

impl FungibleToken for TokenLedger {
    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        self.move_balance(from, to, amount)
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: U256) -> Result<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(DexError::ZeroAddress);
        }
        self.allowances.insert((owner, spender), amount);
        Ok(())
    }

    // An allowance of U256::MAX is never decreased.
    fn transfer_from(&mut self, spender: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(DexError::InsufficientAllowance);
        }
        self.move_balance(from, to, amount)?;
        if allowed != U256::MAX {
            self.allowances.insert((from, spender), allowed - amount);
        }
        Ok(())
    }
}

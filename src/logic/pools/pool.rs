use crate::errors::{DexError, Result};
use crate::ledger::{Event, Ledger};
use crate::logic::factory::sort_tokens;
use crate::logic::math::mul_div;
use crate::logic::pools::lock::with_pool_lock;
use crate::logic::pools::pending_deposit::PendingDeposit;
use crate::logic::pools::pool_state::PoolSnapshot;
use crate::utils::constants::LIQUIDITY_SINK;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Handle to a constant-product pool living in a [`Ledger`].
///
/// The pool never pulls tokens. Callers transfer tokens to the pool's address
/// first, then call [`Pool::mint`] or [`Pool::swap`], which credit whatever
/// arrived since the last reserve sync. Every state-changing call is
/// all-or-nothing and holds the pool's reentrancy lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pool {
    address: Address,
}

impl Display for Pool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pool({})", self.address)
    }
}

impl Pool {
    pub fn at(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Binds the pool to its token pair. Only the deploying factory may call it, once.
    pub fn initialize(&self, ledger: &mut Ledger, caller: Address, token_a: Address, token_b: Address) -> Result<()> {
        ledger.transact(|ledger| {
            let (token0, token1) = sort_tokens(token_a, token_b)?;
            let state = ledger.pool_mut(self.address)?;
            if caller != state.factory() || state.is_initialized() {
                return Err(DexError::InitializationForbidden);
            }
            state.set_tokens(token0, token1);
            Ok(())
        })
    }

    /// Credits the tokens deposited since the last sync and mints shares to `recipient`.
    pub fn mint(&self, ledger: &mut Ledger, caller: Address, recipient: Address) -> Result<U256> {
        ledger.transact(|ledger| {
            with_pool_lock(ledger, self.address, |ledger| {
                let state = ledger.pool(self.address)?;
                let (reserve0, reserve1) = state.reserves();
                let total_supply = self.total_supply(ledger)?;

                let deposit = PendingDeposit::observe(ledger, self.address, U256::ZERO, U256::ZERO)?;
                let settlement = deposit.settle_mint(reserve0, reserve1, total_supply)?;

                if !settlement.locked_shares.is_zero() {
                    self.mint_shares(ledger, LIQUIDITY_SINK, settlement.locked_shares)?;
                }
                self.mint_shares(ledger, recipient, settlement.shares)?;
                self.update_reserves(ledger, settlement.balance0, settlement.balance1)?;
                ledger.emit(self.address, Event::Mint { sender: caller, amount0: settlement.amount0, amount1: settlement.amount1 });

                debug!(pool = %self.address, %recipient, shares = %settlement.shares, amount0 = %settlement.amount0, amount1 = %settlement.amount1, "Liquidity minted");
                Ok(settlement.shares)
            })
        })
    }

    /// Burns the shares held by the pool itself and pays the underlying tokens to `recipient`.
    pub fn burn(&self, ledger: &mut Ledger, caller: Address, recipient: Address) -> Result<(U256, U256)> {
        ledger.transact(|ledger| {
            with_pool_lock(ledger, self.address, |ledger| {
                let state = ledger.pool(self.address)?;
                let (token0, token1) = (state.token0(), state.token1());
                let (reserve0, reserve1) = state.reserves();
                let liquidity = self.balance_of(ledger, self.address)?;
                let total_supply = self.total_supply(ledger)?;

                if total_supply.is_zero() {
                    return Err(DexError::InsufficientLiquidityBurned);
                }
                let amount0 = mul_div(reserve0, liquidity, total_supply)?;
                let amount1 = mul_div(reserve1, liquidity, total_supply)?;
                if amount0.is_zero() || amount1.is_zero() {
                    return Err(DexError::InsufficientLiquidityBurned);
                }

                self.burn_shares(ledger, self.address, liquidity)?;
                ledger.transfer(token0, self.address, recipient, amount0)?;
                ledger.transfer(token1, self.address, recipient, amount1)?;

                let balance0 = ledger.balance_of(token0, self.address)?;
                let balance1 = ledger.balance_of(token1, self.address)?;
                self.update_reserves(ledger, balance0, balance1)?;
                ledger.emit(self.address, Event::Burn { sender: caller, amount0, amount1, to: recipient });

                debug!(pool = %self.address, %recipient, %liquidity, %amount0, %amount1, "Liquidity burned");
                Ok((amount0, amount1))
            })
        })
    }

    /// Pays out the requested amounts, then checks that the tokens received
    /// in this call keep the fee-adjusted product at or above its old value.
    pub fn swap(&self, ledger: &mut Ledger, caller: Address, amount0_out: U256, amount1_out: U256, recipient: Address) -> Result<()> {
        ledger.transact(|ledger| {
            with_pool_lock(ledger, self.address, |ledger| {
                if amount0_out.is_zero() && amount1_out.is_zero() {
                    return Err(DexError::InsufficientOutputAmount);
                }
                let state = ledger.pool(self.address)?;
                let (reserve0, reserve1) = state.reserves();
                let (token0, token1) = (state.token0(), state.token1());
                if amount0_out >= reserve0 || amount1_out >= reserve1 {
                    return Err(DexError::InsufficientLiquidity);
                }
                if recipient == token0 || recipient == token1 {
                    return Err(DexError::InvalidRecipient(recipient));
                }

                if !amount0_out.is_zero() {
                    ledger.transfer(token0, self.address, recipient, amount0_out)?;
                }
                if !amount1_out.is_zero() {
                    ledger.transfer(token1, self.address, recipient, amount1_out)?;
                }

                let deposit = PendingDeposit::observe(ledger, self.address, amount0_out, amount1_out)?;
                let (amount0_in, amount1_in) = deposit.amounts_in();
                debug!(pool = %self.address, %amount0_in, %amount1_in, %amount0_out, %amount1_out, "Settling swap");

                let settlement = deposit.settle_swap(reserve0, reserve1)?;
                self.update_reserves(ledger, settlement.balance0, settlement.balance1)?;
                ledger.emit(
                    self.address,
                    Event::Swap { sender: caller, amount0_in: settlement.amount0_in, amount1_in: settlement.amount1_in, amount0_out, amount1_out, to: recipient },
                );
                Ok(())
            })
        })
    }

    pub fn get_reserves(&self, ledger: &Ledger) -> Result<(U256, U256)> {
        Ok(ledger.pool(self.address)?.reserves())
    }

    pub fn token0(&self, ledger: &Ledger) -> Result<Address> {
        Ok(ledger.pool(self.address)?.token0())
    }

    pub fn token1(&self, ledger: &Ledger) -> Result<Address> {
        Ok(ledger.pool(self.address)?.token1())
    }

    pub fn factory(&self, ledger: &Ledger) -> Result<Address> {
        Ok(ledger.pool(self.address)?.factory())
    }

    pub fn snapshot(&self, ledger: &Ledger) -> Result<PoolSnapshot> {
        Ok(ledger.pool(self.address)?.snapshot())
    }

    // Shares

    pub fn total_supply(&self, ledger: &Ledger) -> Result<U256> {
        ledger.total_supply(self.address)
    }

    pub fn balance_of(&self, ledger: &Ledger, owner: Address) -> Result<U256> {
        ledger.balance_of(self.address, owner)
    }

    pub fn allowance(&self, ledger: &Ledger, owner: Address, spender: Address) -> Result<U256> {
        ledger.allowance(self.address, owner, spender)
    }

    pub fn transfer(&self, ledger: &mut Ledger, caller: Address, to: Address, amount: U256) -> Result<()> {
        ledger.transfer(self.address, caller, to, amount)
    }

    pub fn approve(&self, ledger: &mut Ledger, caller: Address, spender: Address, amount: U256) -> Result<()> {
        ledger.approve(self.address, caller, spender, amount)
    }

    pub fn transfer_from(&self, ledger: &mut Ledger, caller: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        ledger.transfer_from(self.address, caller, from, to, amount)
    }

    fn mint_shares(&self, ledger: &mut Ledger, to: Address, amount: U256) -> Result<()> {
        ledger.pool_mut(self.address)?.shares_mut().mint(to, amount)?;
        ledger.emit(self.address, Event::Transfer { from: Address::ZERO, to, amount });
        Ok(())
    }

    fn burn_shares(&self, ledger: &mut Ledger, from: Address, amount: U256) -> Result<()> {
        ledger.pool_mut(self.address)?.shares_mut().burn(from, amount)?;
        ledger.emit(self.address, Event::Transfer { from, to: Address::ZERO, amount });
        Ok(())
    }

    fn update_reserves(&self, ledger: &mut Ledger, balance0: U256, balance1: U256) -> Result<()> {
        ledger.pool_mut(self.address)?.set_reserves(balance0, balance1);
        Ok(())
    }
}

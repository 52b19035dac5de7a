use crate::errors::{DexError, Result};
use crate::ledger::Ledger;
use crate::logic::math::{checked_mul, checked_sub, mul_div, sqrt};
use crate::utils::constants::{FEE_DENOMINATOR, FEE_TAKEN, MINIMUM_LIQUIDITY};
use alloy_primitives::{Address, U256};

/// Tokens that reached a pool since its reserves were last synced.
///
/// Observed once from the pool's balances and consumed by value by the mint or
/// swap that credits it, so the same transfer can never be counted twice.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct PendingDeposit {
    balance0: U256,
    balance1: U256,
    amount0_in: U256,
    amount1_in: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MintSettlement {
    pub shares: U256,
    pub locked_shares: U256,
    pub amount0: U256,
    pub amount1: U256,
    pub balance0: U256,
    pub balance1: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SwapSettlement {
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub balance0: U256,
    pub balance1: U256,
}

impl PendingDeposit {
    /// Reads the pool's balances. `amount*_out` are the amounts already paid
    /// out of the current reserves in this call.
    pub(crate) fn observe(ledger: &Ledger, pool: Address, amount0_out: U256, amount1_out: U256) -> Result<Self> {
        let state = ledger.pool(pool)?;
        let (reserve0, reserve1) = state.reserves();
        let balance0 = ledger.balance_of(state.token0(), pool)?;
        let balance1 = ledger.balance_of(state.token1(), pool)?;

        let expected0 = checked_sub(reserve0, amount0_out)?;
        let expected1 = checked_sub(reserve1, amount1_out)?;

        Ok(Self { balance0, balance1, amount0_in: balance0.saturating_sub(expected0), amount1_in: balance1.saturating_sub(expected1) })
    }

    pub(crate) fn amounts_in(&self) -> (U256, U256) {
        (self.amount0_in, self.amount1_in)
    }

    pub(crate) fn settle_mint(self, reserve0: U256, reserve1: U256, total_supply: U256) -> Result<MintSettlement> {
        let (shares, locked_shares) = if total_supply.is_zero() {
            let root = sqrt(checked_mul(self.amount0_in, self.amount1_in)?);
            if root <= MINIMUM_LIQUIDITY {
                return Err(DexError::BelowMinimumLiquidity);
            }
            (root - MINIMUM_LIQUIDITY, MINIMUM_LIQUIDITY)
        } else {
            let by_token0 = mul_div(self.amount0_in, total_supply, reserve0)?;
            let by_token1 = mul_div(self.amount1_in, total_supply, reserve1)?;
            (by_token0.min(by_token1), U256::ZERO)
        };

        if shares.is_zero() {
            return Err(DexError::InsufficientLiquidityMinted);
        }

        Ok(MintSettlement {
            shares,
            locked_shares,
            amount0: self.amount0_in,
            amount1: self.amount1_in,
            balance0: self.balance0,
            balance1: self.balance1,
        })
    }

    /// Fee-adjusted invariant: `(b0*1000 - in0*3) * (b1*1000 - in1*3) >= r0 * r1 * 1000^2`.
    pub(crate) fn settle_swap(self, reserve0: U256, reserve1: U256) -> Result<SwapSettlement> {
        if self.amount0_in.is_zero() && self.amount1_in.is_zero() {
            return Err(DexError::InsufficientInputAmount);
        }

        let denominator = U256::from(FEE_DENOMINATOR);
        let fee = U256::from(FEE_TAKEN);
        let adjusted0 = checked_sub(checked_mul(self.balance0, denominator)?, checked_mul(self.amount0_in, fee)?)?;
        let adjusted1 = checked_sub(checked_mul(self.balance1, denominator)?, checked_mul(self.amount1_in, fee)?)?;

        let lhs = checked_mul(adjusted0, adjusted1)?;
        let rhs = checked_mul(checked_mul(reserve0, reserve1)?, checked_mul(denominator, denominator)?)?;
        if lhs < rhs {
            return Err(DexError::K);
        }

        Ok(SwapSettlement { amount0_in: self.amount0_in, amount1_in: self.amount1_in, balance0: self.balance0, balance1: self.balance1 })
    }
}

use crate::errors::{DexError, Result};
use crate::utils::constants::{FEE_DENOMINATOR, FEE_NUMERATOR};
use alloy_primitives::U256;

pub fn checked_add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(DexError::ArithmeticOverflow)
}

pub fn checked_sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b).ok_or(DexError::ArithmeticUnderflow)
}

pub fn checked_mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(DexError::ArithmeticOverflow)
}

/// `a * b / denominator`, floor. A zero denominator is reported as underflow of the reserve it came from.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(DexError::ArithmeticUnderflow);
    }
    Ok(checked_mul(a, b)? / denominator)
}

/// Floor of the square root, Newton's method.
pub fn sqrt(y: U256) -> U256 {
    if y > U256::from(3) {
        let mut z = y;
        let mut x = (y >> 1usize) + U256::from(1);
        while x < z {
            z = x;
            x = (y / x + x) >> 1usize;
        }
        z
    } else if !y.is_zero() {
        U256::from(1)
    } else {
        U256::ZERO
    }
}

/// Constant-product quote with the 0.3% fee taken on the input side.
///
/// `amount_out = floor(amount_in * 997 * reserve_out / (reserve_in * 1000 + amount_in * 997))`
///
/// The pool's K check uses the same constants, so a quote from here always
/// passes the check and `quote + 1` never does.
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if amount_in.is_zero() {
        return Err(DexError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(DexError::InsufficientLiquidity);
    }
    let amount_in_with_fee = checked_mul(amount_in, U256::from(FEE_NUMERATOR))?;
    let numerator = checked_mul(amount_in_with_fee, reserve_out)?;
    let denominator = checked_add(checked_mul(reserve_in, U256::from(FEE_DENOMINATOR))?, amount_in_with_fee)?;
    Ok(numerator / denominator)
}

/// Smallest input that yields at least `amount_out`.
pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if amount_out.is_zero() {
        return Err(DexError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(DexError::InsufficientLiquidity);
    }
    let numerator = checked_mul(checked_mul(reserve_in, amount_out)?, U256::from(FEE_DENOMINATOR))?;
    let denominator = checked_mul(checked_sub(reserve_out, amount_out)?, U256::from(FEE_NUMERATOR))?;
    checked_add(numerator / denominator, U256::from(1))
}

/// Equivalent amount of the other asset at the current reserve ratio, no fee.
pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256> {
    if amount_a.is_zero() {
        return Err(DexError::InsufficientInputAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(DexError::InsufficientLiquidity);
    }
    mul_div(amount_a, reserve_b, reserve_a)
}

use crate::errors::{DexError, Result};
use crate::ledger::Ledger;
use crate::logic::factory::{PoolFactory, sort_tokens};
use crate::logic::math;
use crate::logic::pools::Pool;
use alloy_primitives::{Address, U256};
use tracing::debug;

/// User-facing entry point for liquidity and swaps.
///
/// The router pulls tokens with `transfer_from`, so callers approve the
/// router's address beforehand. All operations are deadline-bound and
/// all-or-nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Router {
    address: Address,
    factory: PoolFactory,
}

impl Router {
    pub fn new(address: Address, factory: &PoolFactory) -> Self {
        Self { address, factory: *factory }
    }

    pub fn deploy(ledger: &mut Ledger, deployer: Address, factory: &PoolFactory) -> Self {
        Self::new(ledger.next_address(deployer), factory)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> &PoolFactory {
        &self.factory
    }

    fn ensure(ledger: &Ledger, deadline: u64) -> Result<()> {
        if ledger.block_timestamp() > deadline {
            return Err(DexError::Expired);
        }
        Ok(())
    }

    fn pool_for(&self, ledger: &Ledger, token_a: Address, token_b: Address) -> Result<Pool> {
        self.factory.get_pool(ledger, token_a, token_b).ok_or(DexError::PoolDoesNotExist)
    }

    /// Reserves of the pair ordered as `(token_a, token_b)`.
    pub fn get_reserves(&self, ledger: &Ledger, token_a: Address, token_b: Address) -> Result<(U256, U256)> {
        let (token0, _) = sort_tokens(token_a, token_b)?;
        let (reserve0, reserve1) = self.pool_for(ledger, token_a, token_b)?.get_reserves(ledger)?;
        Ok(if token_a == token0 { (reserve0, reserve1) } else { (reserve1, reserve0) })
    }

    #[allow(clippy::too_many_arguments)]
    fn optimal_amounts(
        &self,
        ledger: &Ledger,
        token_a: Address,
        token_b: Address,
        amount_a_desired: U256,
        amount_b_desired: U256,
        amount_a_min: U256,
        amount_b_min: U256,
    ) -> Result<(U256, U256)> {
        let (reserve_a, reserve_b) = self.get_reserves(ledger, token_a, token_b)?;
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok((amount_a_desired, amount_b_desired));
        }

        let amount_b_optimal = math::quote(amount_a_desired, reserve_a, reserve_b)?;
        if amount_b_optimal <= amount_b_desired {
            if amount_b_optimal < amount_b_min {
                return Err(DexError::InsufficientBAmount);
            }
            return Ok((amount_a_desired, amount_b_optimal));
        }

        let amount_a_optimal = math::quote(amount_b_desired, reserve_b, reserve_a)?;
        if amount_a_optimal > amount_a_desired {
            return Err(DexError::InsufficientAAmount);
        }
        if amount_a_optimal < amount_a_min {
            return Err(DexError::InsufficientAAmount);
        }
        Ok((amount_a_optimal, amount_b_desired))
    }

    /// Deposits both tokens at the pool's current ratio, creating the pool if
    /// needed, and mints shares to `to`. Returns `(amount_a, amount_b, liquidity)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        token_a: Address,
        token_b: Address,
        amount_a_desired: U256,
        amount_b_desired: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
        deadline: u64,
    ) -> Result<(U256, U256, U256)> {
        ledger.transact(|ledger| {
            Self::ensure(ledger, deadline)?;
            let pool = match self.factory.get_pool(ledger, token_a, token_b) {
                Some(pool) => pool,
                None => self.factory.create_pool(ledger, token_a, token_b)?,
            };

            let (amount_a, amount_b) =
                self.optimal_amounts(ledger, token_a, token_b, amount_a_desired, amount_b_desired, amount_a_min, amount_b_min)?;

            ledger.transfer_from(token_a, self.address, caller, pool.address(), amount_a)?;
            ledger.transfer_from(token_b, self.address, caller, pool.address(), amount_b)?;
            let liquidity = pool.mint(ledger, self.address, to)?;

            debug!(%pool, %caller, %amount_a, %amount_b, %liquidity, "Liquidity added");
            Ok((amount_a, amount_b, liquidity))
        })
    }

    /// Returns `liquidity` shares to the pool and pays the underlying tokens
    /// to `to`. Returns `(amount_a, amount_b)`.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        token_a: Address,
        token_b: Address,
        liquidity: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
        deadline: u64,
    ) -> Result<(U256, U256)> {
        ledger.transact(|ledger| {
            Self::ensure(ledger, deadline)?;
            let pool = self.pool_for(ledger, token_a, token_b)?;

            pool.transfer_from(ledger, self.address, caller, pool.address(), liquidity)?;
            let (amount0, amount1) = pool.burn(ledger, self.address, to)?;

            let (token0, _) = sort_tokens(token_a, token_b)?;
            let (amount_a, amount_b) = if token_a == token0 { (amount0, amount1) } else { (amount1, amount0) };
            if amount_a < amount_a_min {
                return Err(DexError::InsufficientAAmount);
            }
            if amount_b < amount_b_min {
                return Err(DexError::InsufficientBAmount);
            }

            debug!(%pool, %caller, %liquidity, %amount_a, %amount_b, "Liquidity removed");
            Ok((amount_a, amount_b))
        })
    }

    /// Swaps exactly `amount_in` of `token_in` for `token_out` through their
    /// pool and sends the output to `to`. Returns the amount received.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_token_pair(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        to: Address,
        deadline: u64,
    ) -> Result<U256> {
        ledger.transact(|ledger| {
            Self::ensure(ledger, deadline)?;
            let pool = self.pool_for(ledger, token_in, token_out)?;
            let (reserve_in, reserve_out) = self.get_reserves(ledger, token_in, token_out)?;

            let amount_out = math::get_amount_out(amount_in, reserve_in, reserve_out)?;
            if amount_out < min_amount_out {
                return Err(DexError::InsufficientOutputAmount);
            }

            ledger.transfer_from(token_in, self.address, caller, pool.address(), amount_in)?;
            let (token0, _) = sort_tokens(token_in, token_out)?;
            let (amount0_out, amount1_out) = if token_in == token0 { (U256::ZERO, amount_out) } else { (amount_out, U256::ZERO) };
            pool.swap(ledger, self.address, amount0_out, amount1_out, to)?;

            debug!(%pool, %token_in, %token_out, %amount_in, %amount_out, "Swapped");
            Ok(amount_out)
        })
    }

    /// Output of each hop for `amount_in` sent along `path`, starting with `amount_in`.
    pub fn get_amounts_out(&self, ledger: &Ledger, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        if path.len() < 2 {
            return Err(DexError::InvalidPath);
        }
        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        for hop in path.windows(2) {
            let (reserve_in, reserve_out) = self.get_reserves(ledger, hop[0], hop[1])?;
            let previous = amounts[amounts.len() - 1];
            amounts.push(math::get_amount_out(previous, reserve_in, reserve_out)?);
        }
        Ok(amounts)
    }

    pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
        math::get_amount_out(amount_in, reserve_in, reserve_out)
    }

    pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
        math::get_amount_in(amount_out, reserve_in, reserve_out)
    }

    pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256> {
        math::quote(amount_a, reserve_a, reserve_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Event;

    const DEPLOYER: Address = Address::new([0xde; 20]);
    const ALICE: Address = Address::new([0xa1; 20]);
    const BOB: Address = Address::new([0xb0; 20]);

    struct Fixture {
        ledger: Ledger,
        router: Router,
        token_a: Address,
        token_b: Address,
        deadline: u64,
    }

    fn fixture() -> eyre::Result<Fixture> {
        let mut ledger = Ledger::with_timestamp(1_000);
        let factory = PoolFactory::deploy(&mut ledger, DEPLOYER);
        let router = Router::deploy(&mut ledger, DEPLOYER, &factory);
        let token_a = ledger.deploy_token(DEPLOYER, "TKA", 18, false);
        let token_b = ledger.deploy_token(DEPLOYER, "TKB", 18, false);

        for token in [token_a, token_b] {
            ledger.mint(token, ALICE, U256::from(1_000_000))?;
            ledger.approve(token, ALICE, router.address(), U256::MAX)?;
        }
        Ok(Fixture { ledger, router, token_a, token_b, deadline: 2_000 })
    }

    fn seed(f: &mut Fixture) -> eyre::Result<U256> {
        let (_, _, liquidity) = f.router.add_liquidity(
            &mut f.ledger,
            ALICE,
            f.token_a,
            f.token_b,
            U256::from(100_000),
            U256::from(200_000),
            U256::from(100_000),
            U256::from(200_000),
            ALICE,
            f.deadline,
        )?;
        Ok(liquidity)
    }

    #[test]
    fn test_add_liquidity_creates_pool() -> eyre::Result<()> {
        let mut f = fixture()?;
        let liquidity = seed(&mut f)?;
        assert_eq!(liquidity, U256::from(140_421));

        let pool = f.router.factory().get_pool(&f.ledger, f.token_a, f.token_b).ok_or_else(|| eyre::eyre!("pool missing"))?;
        assert_eq!(pool.total_supply(&f.ledger)?, U256::from(141_421));
        assert_eq!(pool.balance_of(&f.ledger, Address::ZERO)?, U256::from(1_000));
        assert_eq!(f.router.get_reserves(&f.ledger, f.token_a, f.token_b)?, (U256::from(100_000), U256::from(200_000)));
        assert_eq!(f.router.get_reserves(&f.ledger, f.token_b, f.token_a)?, (U256::from(200_000), U256::from(100_000)));
        assert!(f.ledger.events().contains(pool.address(), &Event::Mint { sender: f.router.address(), amount0: pool_amount0(&f, pool)?, amount1: pool_amount1(&f, pool)? }));
        Ok(())
    }

    fn pool_amount0(f: &Fixture, pool: Pool) -> eyre::Result<U256> {
        Ok(if pool.token0(&f.ledger)? == f.token_a { U256::from(100_000) } else { U256::from(200_000) })
    }

    fn pool_amount1(f: &Fixture, pool: Pool) -> eyre::Result<U256> {
        Ok(if pool.token0(&f.ledger)? == f.token_a { U256::from(200_000) } else { U256::from(100_000) })
    }

    #[test]
    fn test_add_liquidity_respects_ratio() -> eyre::Result<()> {
        let mut f = fixture()?;
        seed(&mut f)?;

        let result = f.router.add_liquidity(
            &mut f.ledger,
            ALICE,
            f.token_a,
            f.token_b,
            U256::from(100_000),
            U256::from(100_000),
            U256::from(50_001),
            U256::ZERO,
            ALICE,
            f.deadline,
        );
        assert_eq!(result, Err(DexError::InsufficientAAmount));

        let (amount_a, amount_b, liquidity) = f.router.add_liquidity(
            &mut f.ledger,
            ALICE,
            f.token_a,
            f.token_b,
            U256::from(100_000),
            U256::from(100_000),
            U256::from(50_000),
            U256::ZERO,
            ALICE,
            f.deadline,
        )?;
        assert_eq!((amount_a, amount_b, liquidity), (U256::from(50_000), U256::from(100_000), U256::from(70_710)));
        Ok(())
    }

    #[test]
    fn test_expired() -> eyre::Result<()> {
        let mut f = fixture()?;
        let events_before = f.ledger.events().len();
        let result = f.router.add_liquidity(
            &mut f.ledger,
            ALICE,
            f.token_a,
            f.token_b,
            U256::from(100_000),
            U256::from(200_000),
            U256::ZERO,
            U256::ZERO,
            ALICE,
            999,
        );
        assert_eq!(result, Err(DexError::Expired));
        assert_eq!(f.router.factory().get_pool(&f.ledger, f.token_a, f.token_b), None);
        assert_eq!(f.ledger.events().len(), events_before);

        // deadline equal to the current time is still valid
        seed_with_deadline(&mut f, 1_000)?;
        Ok(())
    }

    fn seed_with_deadline(f: &mut Fixture, deadline: u64) -> eyre::Result<()> {
        f.router.add_liquidity(&mut f.ledger, ALICE, f.token_a, f.token_b, U256::from(100_000), U256::from(200_000), U256::ZERO, U256::ZERO, ALICE, deadline)?;
        Ok(())
    }

    #[test]
    fn test_remove_liquidity() -> eyre::Result<()> {
        let mut f = fixture()?;
        seed(&mut f)?;
        let pool = f.router.factory().get_pool(&f.ledger, f.token_a, f.token_b).ok_or_else(|| eyre::eyre!("pool missing"))?;
        pool.approve(&mut f.ledger, ALICE, f.router.address(), U256::MAX)?;

        let result = f.router.remove_liquidity(&mut f.ledger, ALICE, f.token_a, f.token_b, U256::from(10_000), U256::from(10_000), U256::from(10_000), ALICE, f.deadline);
        assert_eq!(result, Err(DexError::InsufficientAAmount));

        let (amount_a, amount_b) = f.router.remove_liquidity(&mut f.ledger, ALICE, f.token_a, f.token_b, U256::from(10_000), U256::ZERO, U256::ZERO, BOB, f.deadline)?;
        // 100000 * 10000 / 141421 and 200000 * 10000 / 141421
        assert_eq!((amount_a, amount_b), (U256::from(7_071), U256::from(14_142)));
        assert_eq!(f.ledger.balance_of(f.token_a, BOB)?, U256::from(7_071));
        assert_eq!(pool.total_supply(&f.ledger)?, U256::from(131_421));

        let (amount0, amount1) = if pool.token0(&f.ledger)? == f.token_a { (amount_a, amount_b) } else { (amount_b, amount_a) };
        let burned = f.ledger.events().last().ok_or_else(|| eyre::eyre!("no events"))?;
        assert_eq!(burned.emitter, pool.address());
        assert_eq!(burned.event, Event::Burn { sender: f.router.address(), amount0, amount1, to: BOB });
        Ok(())
    }

    #[test]
    fn test_burn_without_enough_shares() -> eyre::Result<()> {
        let mut f = fixture()?;
        seed(&mut f)?;
        let pool = f.router.factory().get_pool(&f.ledger, f.token_a, f.token_b).ok_or_else(|| eyre::eyre!("pool missing"))?;
        let reserves = pool.get_reserves(&f.ledger)?;

        assert_eq!(pool.burn(&mut f.ledger, ALICE, ALICE), Err(DexError::InsufficientLiquidityBurned));

        // 100000 * 1 / 141421 rounds down to zero
        pool.transfer(&mut f.ledger, ALICE, pool.address(), U256::from(1))?;
        assert_eq!(pool.burn(&mut f.ledger, ALICE, ALICE), Err(DexError::InsufficientLiquidityBurned));
        assert_eq!(pool.get_reserves(&f.ledger)?, reserves);
        assert_eq!(pool.balance_of(&f.ledger, pool.address())?, U256::from(1));
        assert!(!f.ledger.pool(pool.address())?.is_locked());
        Ok(())
    }

    #[test]
    fn test_remove_liquidity_without_pool() -> eyre::Result<()> {
        let mut f = fixture()?;
        let result = f.router.remove_liquidity(&mut f.ledger, ALICE, f.token_a, f.token_b, U256::from(1), U256::ZERO, U256::ZERO, ALICE, f.deadline);
        assert_eq!(result, Err(DexError::PoolDoesNotExist));
        Ok(())
    }

    #[test]
    fn test_swap_token_pair() -> eyre::Result<()> {
        let mut f = fixture()?;
        seed(&mut f)?;

        let quoted = f.router.get_amounts_out(&f.ledger, U256::from(100_000), &[f.token_a, f.token_b])?;
        assert_eq!(quoted, vec![U256::from(100_000), U256::from(99_849)]);

        let result = f.router.swap_token_pair(&mut f.ledger, ALICE, f.token_a, f.token_b, U256::from(100_000), U256::from(99_850), BOB, f.deadline);
        assert_eq!(result, Err(DexError::InsufficientOutputAmount));

        let amount_out = f.router.swap_token_pair(&mut f.ledger, ALICE, f.token_a, f.token_b, U256::from(100_000), U256::from(99_849), BOB, f.deadline)?;
        assert_eq!(amount_out, U256::from(99_849));
        assert_eq!(f.ledger.balance_of(f.token_b, BOB)?, U256::from(99_849));
        assert_eq!(f.router.get_reserves(&f.ledger, f.token_a, f.token_b)?, (U256::from(200_000), U256::from(100_151)));

        let pool = f.router.factory().get_pool(&f.ledger, f.token_a, f.token_b).ok_or_else(|| eyre::eyre!("pool missing"))?;
        let (amount_in, amount_out) = (U256::from(100_000), U256::from(99_849));
        let expected = if pool.token0(&f.ledger)? == f.token_a {
            Event::Swap { sender: f.router.address(), amount0_in: amount_in, amount1_in: U256::ZERO, amount0_out: U256::ZERO, amount1_out: amount_out, to: BOB }
        } else {
            Event::Swap { sender: f.router.address(), amount0_in: U256::ZERO, amount1_in: amount_in, amount0_out: amount_out, amount1_out: U256::ZERO, to: BOB }
        };
        let swapped = f.ledger.events().last().ok_or_else(|| eyre::eyre!("no events"))?;
        assert_eq!(swapped.emitter, pool.address());
        assert_eq!(swapped.event, expected);
        Ok(())
    }

    #[test]
    fn test_get_amounts_out_invalid_path() -> eyre::Result<()> {
        let f = fixture()?;
        assert_eq!(f.router.get_amounts_out(&f.ledger, U256::from(1), &[f.token_a]), Err(DexError::InvalidPath));
        assert_eq!(f.router.get_amounts_out(&f.ledger, U256::from(1), &[f.token_a, f.token_b]), Err(DexError::PoolDoesNotExist));
        Ok(())
    }

    #[test]
    fn test_swap_requires_allowance() -> eyre::Result<()> {
        let mut f = fixture()?;
        seed(&mut f)?;
        f.ledger.mint(f.token_a, BOB, U256::from(1_000))?;
        let result = f.router.swap_token_pair(&mut f.ledger, BOB, f.token_a, f.token_b, U256::from(1_000), U256::ZERO, BOB, f.deadline);
        assert_eq!(result, Err(DexError::InsufficientAllowance));
        Ok(())
    }
}

use crate::errors::{DexError, Result};
use crate::ledger::Ledger;
use alloy_primitives::Address;

/// Runs `f` while `pool` is locked. A pool that is already locked rejects the
/// call with [`DexError::Locked`]. The lock is released on every exit path.
pub(crate) fn with_pool_lock<T>(ledger: &mut Ledger, pool: Address, f: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
    let state = ledger.pool_mut(pool)?;
    if state.is_locked() {
        return Err(DexError::Locked);
    }
    state.set_locked(true);

    let result = f(ledger);

    if let Ok(state) = ledger.pool_mut(pool) {
        state.set_locked(false);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::pools::PoolState;

    fn ledger_with_pool(pool: Address) -> eyre::Result<Ledger> {
        let mut ledger = Ledger::with_timestamp(1);
        ledger.insert_pool(PoolState::new(pool, Address::repeat_byte(0xfa)))?;
        Ok(ledger)
    }

    #[test]
    fn test_reentry_is_rejected() -> eyre::Result<()> {
        let pool = Address::repeat_byte(0x11);
        let mut ledger = ledger_with_pool(pool)?;

        let inner = with_pool_lock(&mut ledger, pool, |ledger| {
            assert!(ledger.pool(pool)?.is_locked());
            with_pool_lock(ledger, pool, |_| Ok(()))
        });

        assert_eq!(inner, Err(DexError::Locked));
        assert!(!ledger.pool(pool)?.is_locked());
        Ok(())
    }

    #[test]
    fn test_released_after_error() -> eyre::Result<()> {
        let pool = Address::repeat_byte(0x11);
        let mut ledger = ledger_with_pool(pool)?;

        let failed: Result<()> = with_pool_lock(&mut ledger, pool, |_| Err(DexError::K));
        assert_eq!(failed, Err(DexError::K));
        assert!(!ledger.pool(pool)?.is_locked());

        with_pool_lock(&mut ledger, pool, |_| Ok(()))?;
        Ok(())
    }

    #[test]
    fn test_unknown_pool() {
        let mut ledger = Ledger::with_timestamp(1);
        let pool = Address::repeat_byte(0x22);
        assert_eq!(with_pool_lock(&mut ledger, pool, |_| Ok(())), Err(DexError::UnknownPool(pool)));
    }
}

use crate::ledger::{FungibleToken, TokenLedger};
use alloy_primitives::{Address, U256};
use serde::Serialize;

/// Stored state of one pool. Token addresses are zero until the factory
/// initializes the pool.
#[derive(Clone, Debug)]
pub struct PoolState {
    address: Address,
    factory: Address,
    token0: Address,
    token1: Address,
    reserve0: U256,
    reserve1: U256,
    shares: TokenLedger,
    locked: bool,
    initialized: bool,
}

/// Read-only view handed out for logging and inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_supply: U256,
}

impl PoolState {
    pub(crate) fn new(address: Address, factory: Address) -> Self {
        Self {
            address,
            factory,
            token0: Address::ZERO,
            token1: Address::ZERO,
            reserve0: U256::ZERO,
            reserve1: U256::ZERO,
            shares: TokenLedger::new(),
            locked: false,
            initialized: false,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn reserves(&self) -> (U256, U256) {
        (self.reserve0, self.reserve1)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn shares(&self) -> &TokenLedger {
        &self.shares
    }

    pub(crate) fn shares_mut(&mut self) -> &mut TokenLedger {
        &mut self.shares
    }

    pub(crate) fn set_tokens(&mut self, token0: Address, token1: Address) {
        self.token0 = token0;
        self.token1 = token1;
        self.initialized = true;
    }

    pub(crate) fn set_reserves(&mut self, reserve0: U256, reserve1: U256) {
        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            address: self.address,
            token0: self.token0,
            token1: self.token1,
            reserve0: self.reserve0,
            reserve1: self.reserve1,
            total_supply: self.shares.total_supply(),
        }
    }
}

use crate::errors::{DexError, Result};
use crate::ledger::{Event, Ledger};
use crate::logic::pools::{Pool, PoolState};
use crate::utils::FastHashMap;
use crate::utils::constants::POOL_INIT_CODE;
use alloy_primitives::{Address, B256, keccak256};
use alloy_sol_types::SolValue;
use tracing::info;

/// Orders a pair by address. Rejects identical and zero addresses.
pub fn sort_tokens(token_a: Address, token_b: Address) -> Result<(Address, Address)> {
    if token_a == token_b {
        return Err(DexError::IdenticalAddresses);
    }
    let (token0, token1) = if token_a < token_b { (token_a, token_b) } else { (token_b, token_a) };
    if token0.is_zero() {
        return Err(DexError::ZeroAddress);
    }
    Ok((token0, token1))
}

/// `keccak256(token0 ++ token1)` over the sorted pair.
pub fn pool_salt(token_a: Address, token_b: Address) -> Result<B256> {
    let (token0, token1) = sort_tokens(token_a, token_b)?;
    Ok(keccak256((token0, token1).abi_encode_packed()))
}

/// Deterministic pool address, computable without touching any state.
pub fn compute_pool_address(factory: Address, token_a: Address, token_b: Address, init_code_hash: B256) -> Result<Address> {
    Ok(factory.create2(pool_salt(token_a, token_b)?, init_code_hash))
}

#[derive(Clone, Debug)]
pub struct FactoryState {
    address: Address,
    init_code_hash: B256,
    pools: FastHashMap<(Address, Address), Address>,
    all_pools: Vec<Address>,
}

impl FactoryState {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn init_code_hash(&self) -> B256 {
        self.init_code_hash
    }
}

/// Handle to a pool registry. At most one pool exists per unordered token pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolFactory {
    address: Address,
}

impl PoolFactory {
    pub fn deploy(ledger: &mut Ledger, deployer: Address) -> Self {
        Self::deploy_with_init_code(ledger, deployer, POOL_INIT_CODE)
    }

    pub fn deploy_with_init_code(ledger: &mut Ledger, deployer: Address, init_code: &[u8]) -> Self {
        let address = ledger.next_address(deployer);
        let init_code_hash = keccak256(init_code);
        ledger.insert_factory(FactoryState { address, init_code_hash, pools: FastHashMap::default(), all_pools: Vec::new() });
        info!(factory = %address, %init_code_hash, "Factory deployed");
        Self { address }
    }

    /// Handle to an already deployed factory.
    pub fn at(ledger: &Ledger, address: Address) -> Result<Self> {
        ledger.factory(address)?;
        Ok(Self { address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn init_code_hash(&self, ledger: &Ledger) -> Result<B256> {
        Ok(ledger.factory(self.address)?.init_code_hash())
    }

    pub fn pool_address_for(&self, ledger: &Ledger, token_a: Address, token_b: Address) -> Result<Address> {
        compute_pool_address(self.address, token_a, token_b, self.init_code_hash(ledger)?)
    }

    /// The pool for the pair in either order, `None` if it was never created.
    pub fn get_pool(&self, ledger: &Ledger, token_a: Address, token_b: Address) -> Option<Pool> {
        let (token0, token1) = sort_tokens(token_a, token_b).ok()?;
        let state = ledger.factory(self.address).ok()?;
        state.pools.get(&(token0, token1)).copied().map(Pool::at)
    }

    pub fn all_pools(&self, ledger: &Ledger) -> Result<Vec<Pool>> {
        Ok(ledger.factory(self.address)?.all_pools.iter().copied().map(Pool::at).collect())
    }

    pub fn all_pools_length(&self, ledger: &Ledger) -> Result<usize> {
        Ok(ledger.factory(self.address)?.all_pools.len())
    }

    pub fn create_pool(&self, ledger: &mut Ledger, token_a: Address, token_b: Address) -> Result<Pool> {
        ledger.transact(|ledger| {
            let (token0, token1) = sort_tokens(token_a, token_b)?;
            if let Some(existing) = self.get_pool(ledger, token0, token1) {
                return Err(DexError::PoolExists(existing.address()));
            }

            let address = self.pool_address_for(ledger, token0, token1)?;
            ledger.insert_pool(PoolState::new(address, self.address))?;
            let pool = Pool::at(address);
            pool.initialize(ledger, self.address, token0, token1)?;

            let state = ledger.factory_mut(self.address)?;
            state.pools.insert((token0, token1), address);
            state.all_pools.push(address);
            let index = state.all_pools.len();
            ledger.emit(self.address, Event::PoolCreated { token0, token1, pool: address });

            info!(factory = %self.address, %token0, %token1, pool = %address, index, "Pool created");
            Ok(pool)
        })
    }
}

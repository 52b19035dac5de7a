use crate::errors::{DexError, Result};
use crate::ledger::events::{Event, EventLog};
use crate::ledger::hooks::{TransferHookWrapper, TransferNotification};
use crate::ledger::token_ledger::{FungibleToken, TokenLedger};
use crate::logic::factory::FactoryState;
use crate::logic::pools::PoolState;
use crate::utils::{FastHashMap, Token};
use alloy_primitives::{Address, U256};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

#[derive(Clone, Debug)]
struct TokenEntry {
    info: Token,
    balances: TokenLedger,
    hooks_enabled: bool,
}

#[derive(Clone, Default)]
struct WorldState {
    timestamp: u64,
    nonces: FastHashMap<Address, u64>,
    tokens: FastHashMap<Address, TokenEntry>,
    pools: FastHashMap<Address, PoolState>,
    factories: FastHashMap<Address, FactoryState>,
    hooks: FastHashMap<Address, TransferHookWrapper>,
}

/// Single-threaded host for every contract in the engine: token balances,
/// pools, factories, the block clock and the event log.
///
/// State-changing entry points run inside [`Ledger::transact`], which makes a
/// call all-or-nothing. Nested calls take their own checkpoint, so a failing
/// inner call never leaves partial writes behind even if the outer call
/// chooses to continue.
#[derive(Clone, Default)]
pub struct Ledger {
    world: WorldState,
    events: EventLog,
}

struct Checkpoint {
    world: WorldState,
    events_len: usize,
}

impl Ledger {
    pub fn new() -> Self {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
        Self::with_timestamp(timestamp)
    }

    pub fn with_timestamp(timestamp: u64) -> Self {
        let mut ledger = Self::default();
        ledger.world.timestamp = timestamp;
        ledger
    }

    // Clock

    pub fn block_timestamp(&self) -> u64 {
        self.world.timestamp
    }

    pub fn set_block_timestamp(&mut self, timestamp: u64) {
        self.world.timestamp = timestamp;
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.world.timestamp = self.world.timestamp.saturating_add(secs);
    }

    // Transactions

    /// Runs `f` against this ledger. If it fails every write it made,
    /// including emitted events, is discarded.
    ///
    /// Each call snapshots the whole world state, and nested calls snapshot
    /// again, so the cost of a call grows with the number of tokens, pools and
    /// holders in the ledger.
    pub fn transact<T>(&mut self, f: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if let Err(error) = &result {
            debug!(%error, discarded_events = self.events.len().saturating_sub(checkpoint.events_len), "Reverting call");
            self.revert_to(checkpoint);
        }
        result
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint { world: self.world.clone(), events_len: self.events.len() }
    }

    fn revert_to(&mut self, checkpoint: Checkpoint) {
        self.world = checkpoint.world;
        self.events.truncate(checkpoint.events_len);
    }

    /// Address the next contract deployed by `deployer` will get.
    pub fn next_address(&mut self, deployer: Address) -> Address {
        let nonce = self.world.nonces.entry(deployer).or_default();
        let address = deployer.create(*nonce);
        *nonce += 1;
        address
    }

    // Events

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub(crate) fn emit(&mut self, emitter: Address, event: Event) {
        self.events.push(emitter, event);
    }

    // Tokens

    /// Registers a token at its own address. If the address is already taken nothing will happen.
    pub fn add_token(&mut self, token: Token, hooks_enabled: bool) -> Address {
        let address = token.get_address();
        if !self.is_token(address) && !self.is_pool(address) {
            debug!(%address, symbol = %token.get_symbol(), hooks_enabled, "Token registered");
            self.world.tokens.insert(address, TokenEntry { info: token, balances: TokenLedger::new(), hooks_enabled });
        }
        address
    }

    /// Deploys a fresh token at the next address of `deployer`.
    pub fn deploy_token(&mut self, deployer: Address, symbol: &str, decimals: u8, hooks_enabled: bool) -> Address {
        let address = self.next_address(deployer);
        let token = Token::new_with_data(address, Some(symbol.to_string()), Some(decimals));
        self.add_token(token, hooks_enabled)
    }

    pub fn is_token(&self, address: Address) -> bool {
        self.world.tokens.contains_key(&address)
    }

    pub fn token_info(&self, address: Address) -> Option<&Token> {
        self.world.tokens.get(&address).map(|entry| &entry.info)
    }

    /// Creates `amount` of `token` out of thin air. Pool shares can only be minted by their pool.
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<()> {
        self.transact(|ledger| {
            let entry = ledger.world.tokens.get_mut(&token).ok_or(DexError::UnknownToken(token))?;
            entry.balances.mint(to, amount)?;
            ledger.emit(token, Event::Transfer { from: Address::ZERO, to, amount });
            Ok(())
        })
    }

    fn fungible(&self, token: Address) -> Result<&TokenLedger> {
        if let Some(entry) = self.world.tokens.get(&token) {
            return Ok(&entry.balances);
        }
        if let Some(pool) = self.world.pools.get(&token) {
            return Ok(pool.shares());
        }
        Err(DexError::UnknownToken(token))
    }

    fn fungible_mut(&mut self, token: Address) -> Result<&mut TokenLedger> {
        if let Some(entry) = self.world.tokens.get_mut(&token) {
            return Ok(&mut entry.balances);
        }
        if let Some(pool) = self.world.pools.get_mut(&token) {
            return Ok(pool.shares_mut());
        }
        Err(DexError::UnknownToken(token))
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        Ok(self.fungible(token)?.balance_of(owner))
    }

    pub fn total_supply(&self, token: Address) -> Result<U256> {
        Ok(self.fungible(token)?.total_supply())
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        Ok(self.fungible(token)?.allowance(owner, spender))
    }

    /// Moves `amount` of `token` from `from`, who must be the caller, to `to`.
    pub fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        self.transact(|ledger| {
            ledger.fungible_mut(token)?.transfer(from, to, amount)?;
            ledger.emit(token, Event::Transfer { from, to, amount });
            ledger.notify_recipient(TransferNotification { token, operator: from, from, to, amount })
        })
    }

    pub fn transfer_from(&mut self, token: Address, spender: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        self.transact(|ledger| {
            ledger.fungible_mut(token)?.transfer_from(spender, from, to, amount)?;
            ledger.emit(token, Event::Transfer { from, to, amount });
            ledger.notify_recipient(TransferNotification { token, operator: spender, from, to, amount })
        })
    }

    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: U256) -> Result<()> {
        self.transact(|ledger| {
            ledger.fungible_mut(token)?.approve(owner, spender, amount)?;
            ledger.emit(token, Event::Approval { owner, spender, amount });
            Ok(())
        })
    }

    // Hooks

    /// Installs `hook` as the receiver callback of `account`. Replaces any previous hook.
    pub fn register_hook(&mut self, account: Address, hook: TransferHookWrapper) {
        self.world.hooks.insert(account, hook);
    }

    pub fn remove_hook(&mut self, account: Address) {
        self.world.hooks.remove(&account);
    }

    fn notify_recipient(&mut self, notification: TransferNotification) -> Result<()> {
        let hooks_enabled = self.world.tokens.get(&notification.token).is_some_and(|entry| entry.hooks_enabled);
        if !hooks_enabled {
            return Ok(());
        }
        let Some(hook) = self.world.hooks.get(&notification.to).cloned() else {
            return Ok(());
        };
        debug!(token = %notification.token, to = %notification.to, "Calling recipient hook");
        hook.tokens_received(self, notification)
    }

    // Pools and factories

    pub fn is_pool(&self, address: Address) -> bool {
        self.world.pools.contains_key(&address)
    }

    pub fn pool(&self, address: Address) -> Result<&PoolState> {
        self.world.pools.get(&address).ok_or(DexError::UnknownPool(address))
    }

    pub(crate) fn pool_mut(&mut self, address: Address) -> Result<&mut PoolState> {
        self.world.pools.get_mut(&address).ok_or(DexError::UnknownPool(address))
    }

    pub(crate) fn insert_pool(&mut self, state: PoolState) -> Result<()> {
        let address = state.address();
        if self.is_pool(address) || self.is_token(address) {
            return Err(DexError::PoolExists(address));
        }
        self.world.pools.insert(address, state);
        Ok(())
    }

    pub fn factory(&self, address: Address) -> Result<&FactoryState> {
        self.world.factories.get(&address).ok_or(DexError::UnknownFactory(address))
    }

    pub(crate) fn factory_mut(&mut self, address: Address) -> Result<&mut FactoryState> {
        self.world.factories.get_mut(&address).ok_or(DexError::UnknownFactory(address))
    }

    pub(crate) fn insert_factory(&mut self, state: FactoryState) {
        self.world.factories.insert(state.address(), state);
    }
}

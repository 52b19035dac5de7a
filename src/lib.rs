// Three-Layer Architecture
pub mod ledger; // Data Layer: balances, pools, clock and event log behind one transaction boundary
pub mod logic; // Logic Layer: pool math, pools and the pool factory
pub mod execution; // Execution Layer: router, flash loans and arbitrage

// Common utilities and types
pub mod errors;
pub mod utils;

// Re-export key components from each layer
pub use errors::{DexError, Result};
pub use execution::{
    ArbitrageEngine, ArbitrageEngineBuilder, ArbitrageEngineStats, ArbitrageReport, ArbitrageState, CycleRoute, FlashLender, FlashLenderWrapper,
    FlashLoanReceiver, LendingPool, Router,
};
pub use ledger::{Event, EventLog, FungibleToken, Ledger, LogRecord, TokenLedger, TransferHook, TransferHookWrapper, TransferNotification};
pub use logic::{FactoryState, Pool, PoolFactory, PoolSnapshot, PoolState, compute_pool_address, pool_salt, sort_tokens};
pub use utils::{ArbitrageConfigSection, DexConfig, FlashLoanConfigSection, RouterConfigSection, Token};

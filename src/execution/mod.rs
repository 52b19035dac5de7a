/// Execution Layer
///
/// This layer is responsible for:
/// - Deadline-bound liquidity management and swaps on behalf of users
/// - Flash-loan lending with a basis-point premium
/// - Flash-loan funded arbitrage across a three-hop cycle
pub mod arbitrage_engine;
pub mod flash_loan;
pub mod router;
pub mod types;

pub use arbitrage_engine::{ArbitrageEngine, ArbitrageEngineBuilder};
pub use flash_loan::{FlashLender, FlashLenderWrapper, FlashLoanReceiver, LendingPool};
pub use router::Router;
pub use types::{ArbitrageEngineStats, ArbitrageReport, ArbitrageState, CycleRoute};

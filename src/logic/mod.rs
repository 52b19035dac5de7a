/// Logic Layer - constant-product pools and their registry
///
/// This layer is responsible for:
/// - Pool accounting: shares, reserves and the fee-adjusted invariant
/// - Deterministic pool addresses and the one-pool-per-pair registry
/// - The pricing formulas shared by pools and the router
pub mod factory;
pub mod math;
pub mod pools;

pub use factory::{FactoryState, PoolFactory, compute_pool_address, pool_salt, sort_tokens};
pub use pools::{Pool, PoolSnapshot, PoolState};

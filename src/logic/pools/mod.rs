mod lock;
mod pending_deposit;
pub mod pool;
pub mod pool_state;

pub use pool::Pool;
pub use pool_state::{PoolSnapshot, PoolState};

pub mod config;
pub mod config_loader;
pub mod constants;
pub mod token;

use ahash::RandomState;
use std::collections::HashMap;

pub use config::{ArbitrageConfigSection, DexConfig, FlashLoanConfigSection, RouterConfigSection};
pub use config_loader::*;
pub use constants::*;
pub use token::Token;

pub type FastHasher = RandomState;
/// FastHashMap using ahash
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;

use crate::errors::{DexError, Result};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Lifecycle of the arbitrage engine around one flash loan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize)]
pub enum ArbitrageState {
    #[default]
    Idle,
    LoanRequested,
    Settled,
}

/// Three-hop cycle `borrow -> hop1 -> hop2 -> borrow`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CycleRoute {
    pub borrow_token: Address,
    pub hop1: Address,
    pub hop2: Address,
}

impl CycleRoute {
    pub fn new(borrow_token: Address, hop1: Address, hop2: Address) -> Self {
        Self { borrow_token, hop1, hop2 }
    }

    pub fn path(&self) -> [Address; 4] {
        [self.borrow_token, self.hop1, self.hop2, self.borrow_token]
    }

    /// Callback payload: packed `hop1 ++ hop2`.
    pub fn encode_params(&self) -> Bytes {
        Bytes::from((self.hop1, self.hop2).abi_encode_packed())
    }

    pub fn decode_params(borrow_token: Address, params: &[u8]) -> Result<Self> {
        if params.len() != 40 {
            return Err(DexError::InvalidCallbackData);
        }
        let hop1 = Address::from_slice(&params[..20]);
        let hop2 = Address::from_slice(&params[20..]);
        Ok(Self { borrow_token, hop1, hop2 })
    }
}

/// Outcome of a settled arbitrage
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArbitrageReport {
    pub route: CycleRoute,
    /// Amount entering each hop followed by the final output
    pub amounts: Vec<U256>,
    pub borrowed: U256,
    pub premium: U256,
    pub final_balance: U256,
    pub net_profit: U256,
}

impl ArbitrageReport {
    pub fn repaid(&self) -> U256 {
        self.borrowed.saturating_add(self.premium)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArbitrageEngineStats {
    pub state: ArbitrageState,
    pub settled_count: u64,
    pub rejected_count: u64,
    pub min_profit: U256,
}

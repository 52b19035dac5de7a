use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Descriptive data of a fungible token. Balances live in the ledger, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    address: Address,
    decimals: u8,
    symbol: Option<String>,
}

impl Token {
    pub fn new_with_data(address: Address, symbol: Option<String>, decimals: Option<u8>) -> Token {
        Token { address, symbol, decimals: decimals.unwrap_or(18) }
    }

    pub fn get_address(&self) -> Address {
        self.address
    }

    pub fn get_symbol(&self) -> String {
        self.symbol.clone().unwrap_or_else(|| self.address.to_string())
    }

    pub fn get_decimals(&self) -> u8 {
        self.decimals
    }

    /// `10^decimals`, saturating at `U256::MAX` past 77 decimals.
    pub fn get_exp(&self) -> U256 {
        U256::from(10).saturating_pow(U256::from(self.decimals))
    }

    /// Whole units to base units, e.g. `parse_units(1000)` on a 6-decimals token is `1_000_000_000`.
    pub fn parse_units(&self, whole: u64) -> U256 {
        U256::from(whole).saturating_mul(self.get_exp())
    }

    /// Lossy conversion for logs. Returns zero if the decimals cannot be formatted.
    pub fn to_float(&self, value: U256) -> f64 {
        format_units(value, self.decimals).ok().and_then(|formatted| formatted.parse::<f64>().ok()).unwrap_or_default()
    }
}

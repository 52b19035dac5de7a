use crate::utils::config_loader::{DexConfigLoader, DexConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::BPS_DENOMINATOR;
use alloy_primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of the engine's TOML configuration. Every section is optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DexConfig {
    #[serde(default)]
    pub router: RouterConfigSection,
    #[serde(default)]
    pub flash_loan: FlashLoanConfigSection,
    #[serde(default)]
    pub arbitrage: ArbitrageConfigSection,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfigSection {
    /// Validity window applied by callers that do not pick their own deadline
    pub default_deadline_secs: u64,
}

impl Default for RouterConfigSection {
    fn default() -> Self {
        Self { default_deadline_secs: 1_200 }
    }
}

impl RouterConfigSection {
    pub fn default_deadline(&self) -> Duration {
        Duration::from_secs(self.default_deadline_secs)
    }

    /// Deadline `default_deadline_secs` after `now`.
    pub fn deadline_from(&self, now: u64) -> u64 {
        now.saturating_add(self.default_deadline_secs)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FlashLoanConfigSection {
    /// Lender fee in basis points of the borrowed amount
    pub premium_bps: u64,
}

impl Default for FlashLoanConfigSection {
    fn default() -> Self {
        Self { premium_bps: 5 }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ArbitrageConfigSection {
    /// Smallest net result, in base units of the borrowed token, that still
    /// counts as a loss. Zero means any positive result is accepted.
    pub min_profit: u64,
}

impl ArbitrageConfigSection {
    pub fn with_min_profit(&self, min_profit: u64) -> Self {
        Self { min_profit }
    }

    pub fn min_profit(&self) -> U256 {
        U256::from(self.min_profit)
    }
}

impl DexConfig {
    /// Defaults overridden by `DEX_ROUTER_DEADLINE_SECS`, `DEX_FLASH_LOAN_PREMIUM_BPS`
    /// and `DEX_ARBITRAGE_MIN_PROFIT` when set.
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(deadline_str) = std::env::var("DEX_ROUTER_DEADLINE_SECS") {
            config.router.default_deadline_secs = deadline_str.parse().map_err(|e| eyre::eyre!("Invalid DEX_ROUTER_DEADLINE_SECS: {}", e))?;
        }

        if let Ok(premium_str) = std::env::var("DEX_FLASH_LOAN_PREMIUM_BPS") {
            config.flash_loan.premium_bps = premium_str.parse().map_err(|e| eyre::eyre!("Invalid DEX_FLASH_LOAN_PREMIUM_BPS: {}", e))?;
        }

        if let Ok(min_profit_str) = std::env::var("DEX_ARBITRAGE_MIN_PROFIT") {
            config.arbitrage.min_profit = min_profit_str.parse().map_err(|e| eyre::eyre!("Invalid DEX_ARBITRAGE_MIN_PROFIT: {}", e))?;
        }

        config.validate().map_err(|e| eyre::eyre!(e))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadConfigError> {
        if self.flash_loan.premium_bps > BPS_DENOMINATOR {
            return Err(LoadConfigError::ConfigError(format!(
                "flash_loan.premium_bps must not exceed {}, got {}",
                BPS_DENOMINATOR, self.flash_loan.premium_bps
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DexConfigLoader for DexConfig {
    type SectionType = DexConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DexConfig = load_from_file(file_name).await?;
        root.validate()?;
        Ok(root)
    }
}

impl DexConfigLoaderSync for DexConfig {
    type SectionType = DexConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DexConfig = load_from_file_sync(file_name)?;
        root.validate()?;
        Ok(root)
    }
}

#[async_trait]
impl DexConfigLoader for ArbitrageConfigSection {
    type SectionType = ArbitrageConfigSection;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DexConfig = load_from_file(file_name).await?;
        Ok(root.arbitrage)
    }
}

impl DexConfigLoaderSync for ArbitrageConfigSection {
    type SectionType = ArbitrageConfigSection;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DexConfig = load_from_file_sync(file_name)?;
        Ok(root.arbitrage)
    }
}

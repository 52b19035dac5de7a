use crate::errors::{DexError, Result};
use crate::ledger::{Event, Ledger};
use crate::logic::math::{checked_add, checked_mul};
use crate::utils::config::FlashLoanConfigSection;
use crate::utils::constants::BPS_DENOMINATOR;
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tracing::debug;

/// Contract that borrows through [`FlashLender::flash_loan_simple`].
pub trait FlashLoanReceiver {
    fn address(&self) -> Address;

    /// Called after `amount` of `asset` has been sent to the receiver. Must
    /// leave an allowance of `amount + premium` for `lender` and return `true`.
    #[allow(clippy::too_many_arguments)]
    fn execute_operation(
        &mut self,
        ledger: &mut Ledger,
        lender: Address,
        asset: Address,
        amount: U256,
        premium: U256,
        initiator: Address,
        params: &[u8],
    ) -> Result<bool>;
}

/// Single-asset flash-loan provider.
pub trait FlashLender: Send + Sync {
    fn address(&self) -> Address;

    fn premium_for(&self, amount: U256) -> Result<U256>;

    /// Lends `amount` of `asset` to `receiver` for the duration of its callback.
    /// Fails as a whole if the receiver does not return success or cannot repay.
    fn flash_loan_simple(
        &self,
        ledger: &mut Ledger,
        initiator: Address,
        receiver: &mut dyn FlashLoanReceiver,
        asset: Address,
        amount: U256,
        params: &[u8],
    ) -> Result<()>;
}

pub type FlashLenderWrapper = Arc<dyn FlashLender>;

/// In-ledger lender charging a basis-point premium rounded half up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LendingPool {
    address: Address,
    premium_bps: u64,
}

impl LendingPool {
    pub fn new(address: Address, premium_bps: u64) -> Self {
        Self { address, premium_bps }
    }

    pub fn deploy(ledger: &mut Ledger, deployer: Address, config: &FlashLoanConfigSection) -> Self {
        Self::new(ledger.next_address(deployer), config.premium_bps)
    }

    pub fn premium_bps(&self) -> u64 {
        self.premium_bps
    }

    /// Funds the pool with `amount` of `asset` taken from `provider`.
    pub fn deposit(&self, ledger: &mut Ledger, provider: Address, asset: Address, amount: U256) -> Result<()> {
        ledger.transfer(asset, provider, self.address, amount)
    }
}

impl FlashLender for LendingPool {
    fn address(&self) -> Address {
        self.address
    }

    fn premium_for(&self, amount: U256) -> Result<U256> {
        let half = U256::from(BPS_DENOMINATOR / 2);
        Ok(checked_add(checked_mul(amount, U256::from(self.premium_bps))?, half)? / U256::from(BPS_DENOMINATOR))
    }

    fn flash_loan_simple(
        &self,
        ledger: &mut Ledger,
        initiator: Address,
        receiver: &mut dyn FlashLoanReceiver,
        asset: Address,
        amount: U256,
        params: &[u8],
    ) -> Result<()> {
        ledger.transact(|ledger| {
            let target = receiver.address();
            let premium = self.premium_for(amount)?;
            debug!(lender = %self.address, %target, %asset, %amount, %premium, "Flash loan requested");

            ledger.transfer(asset, self.address, target, amount)?;
            if !receiver.execute_operation(ledger, self.address, asset, amount, premium, initiator, params)? {
                return Err(DexError::FlashLoanRejected);
            }

            let owed = checked_add(amount, premium)?;
            ledger.transfer_from(asset, self.address, target, self.address, owed)?;
            ledger.emit(self.address, Event::FlashLoan { target, initiator, asset, amount, premium });
            Ok(())
        })
    }
}

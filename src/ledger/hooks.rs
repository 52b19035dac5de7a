use crate::errors::Result;
use crate::ledger::Ledger;
use alloy_primitives::{Address, U256};
use std::sync::Arc;

/// Recipient notification for tokens created with hooks enabled.
///
/// Called after balances have moved, with full access to the ledger, so an
/// implementation can call back into any contract (including the pool that is
/// paying it out). Returning an error aborts the transfer that triggered it.
pub trait TransferHook: Send + Sync {
    fn tokens_received(&self, ledger: &mut Ledger, notification: TransferNotification) -> Result<()>;
}

pub type TransferHookWrapper = Arc<dyn TransferHook>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferNotification {
    pub token: Address,
    pub operator: Address,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

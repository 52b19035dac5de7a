pub mod events;
pub mod hooks;
pub mod state;
pub mod token_ledger;

pub use events::{Event, EventLog, LogRecord};
pub use hooks::{TransferHook, TransferHookWrapper, TransferNotification};
pub use state::Ledger;
pub use token_ledger::{FungibleToken, TokenLedger};

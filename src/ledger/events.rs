use alloy_primitives::{Address, B256, U256, keccak256};
use serde::Serialize;
use strum_macros::Display;

/// Everything the engine emits. Field names follow the log arguments.
#[derive(Clone, Debug, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "event")]
pub enum Event {
    PoolCreated { token0: Address, token1: Address, pool: Address },
    Mint { sender: Address, amount0: U256, amount1: U256 },
    Burn { sender: Address, amount0: U256, amount1: U256, to: Address },
    Swap { sender: Address, amount0_in: U256, amount1_in: U256, amount0_out: U256, amount1_out: U256, to: Address },
    Transfer { from: Address, to: Address, amount: U256 },
    Approval { owner: Address, spender: Address, amount: U256 },
    FlashLoan { target: Address, initiator: Address, asset: Address, amount: U256, premium: U256 },
}

impl Event {
    /// Canonical signature, the preimage of topic0.
    pub fn signature(&self) -> &'static str {
        match self {
            Event::PoolCreated { .. } => "PoolCreated(address,address,address)",
            Event::Mint { .. } => "Mint(address,uint256,uint256)",
            Event::Burn { .. } => "Burn(address,uint256,uint256,address)",
            Event::Swap { .. } => "Swap(address,uint256,uint256,uint256,uint256,address)",
            Event::Transfer { .. } => "Transfer(address,address,uint256)",
            Event::Approval { .. } => "Approval(address,address,uint256)",
            Event::FlashLoan { .. } => "FlashLoan(address,address,address,uint256,uint256)",
        }
    }

    pub fn topic0(&self) -> B256 {
        keccak256(self.signature())
    }
}

/// One appended log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub emitter: Address,
    pub topic0: B256,
    #[serde(flatten)]
    pub event: Event,
}

/// Append-only event log. Entries are only ever removed when the call that
/// produced them is rolled back.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Vec<LogRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, emitter: Address, event: Event) {
        let topic0 = event.topic0();
        self.records.push(LogRecord { emitter, topic0, event });
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&LogRecord> {
        self.records.last()
    }

    /// Records emitted by `emitter`, oldest first.
    pub fn emitted_by(&self, emitter: Address) -> impl Iterator<Item = &LogRecord> {
        self.records.iter().filter(move |record| record.emitter == emitter)
    }

    /// Records appended at or after position `from`.
    pub fn since(&self, from: usize) -> &[LogRecord] {
        &self.records[from.min(self.records.len())..]
    }

    pub fn contains(&self, emitter: Address, event: &Event) -> bool {
        self.records.iter().any(|record| record.emitter == emitter && &record.event == event)
    }
}

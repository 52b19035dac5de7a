use alloy_primitives::Address;

pub type Result<T, E = DexError> = std::result::Result<T, E>;

/// Every failure the engine can surface. A call that returns one of these has
/// had all of its writes discarded by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DexError {
    // Pool
    #[error("pool initialization forbidden")]
    InitializationForbidden,
    #[error("first deposit does not exceed the minimum liquidity")]
    BelowMinimumLiquidity,
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,
    #[error("K")]
    K,
    #[error("locked")]
    Locked,
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
    #[error("insufficient input amount")]
    InsufficientInputAmount,
    #[error("invalid recipient {0}")]
    InvalidRecipient(Address),

    // Factory
    #[error("identical addresses")]
    IdenticalAddresses,
    #[error("zero address")]
    ZeroAddress,
    #[error("pool already exists at {0}")]
    PoolExists(Address),

    // Router
    #[error("expired")]
    Expired,
    #[error("insufficient A amount")]
    InsufficientAAmount,
    #[error("insufficient B amount")]
    InsufficientBAmount,
    #[error("insufficient output amount")]
    InsufficientOutputAmount,
    #[error("pool does not exist")]
    PoolDoesNotExist,
    #[error("invalid path")]
    InvalidPath,

    // Ledger
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("transfer amount exceeds balance")]
    ExceedsBalance,
    #[error("unknown token {0}")]
    UnknownToken(Address),
    #[error("unknown pool {0}")]
    UnknownPool(Address),
    #[error("unknown factory {0}")]
    UnknownFactory(Address),

    // Arbitrage
    #[error("no profit")]
    NoProfit,
    #[error("only owner")]
    OnlyOwner,
    #[error("unauthorized flash loan callback")]
    UnauthorizedCallback,
    #[error("flash loan receiver returned failure")]
    FlashLoanRejected,
    #[error("invalid flash loan callback data")]
    InvalidCallbackData,

    // Arithmetic
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("arithmetic underflow")]
    ArithmeticUnderflow,
}

impl DexError {
    /// Overflow and underflow abort the whole call and are never worth retrying
    /// with the same inputs.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, DexError::ArithmeticOverflow | DexError::ArithmeticUnderflow)
    }
}

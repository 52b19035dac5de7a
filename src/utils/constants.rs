use alloy_primitives::{Address, B256, U256, address, b256};

/// Shares locked forever on the first deposit of every pool.
pub const MINIMUM_LIQUIDITY: U256 = U256::from_limbs([1_000, 0, 0, 0]);

/// Principal that receives the locked minimum liquidity. Nothing can ever move shares out of it.
pub const LIQUIDITY_SINK: Address = Address::ZERO;

// 0.3% swap fee expressed as 997 / 1000 on the input side.
pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1_000;
pub const FEE_TAKEN: u64 = FEE_DENOMINATOR - FEE_NUMERATOR;

/// Creation code of the pool implementation. Its keccak256 is the init code hash mixed into every pool address.
pub const POOL_INIT_CODE: &[u8] = b"dex-engine/constant-product-pool/v1";

/// Basis point denominator used by the lending collaborator.
pub const BPS_DENOMINATOR: u64 = 10_000;

#[non_exhaustive]
pub struct EthFactoryAddress;

impl EthFactoryAddress {
    pub const UNISWAP_V2: Address = address!("5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f");
    pub const UNISWAP_V2_INIT_CODE_HASH: B256 = b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");
}

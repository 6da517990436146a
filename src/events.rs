//! Decoded pool-contract events consumed by the reconciler.
//!
//! Decoding and chain following happen upstream; events arrive here
//! already ordered by `(block, transaction, log index)`.

use alloy::primitives::{Address, B256, U256};

/// Per-log metadata shared by every event kind.
#[derive(Clone, Debug)]
pub struct EventMeta {
    /// Block number the log was emitted in
    pub block_number: u64,
    /// Block timestamp, seconds
    pub timestamp: u64,
    /// Enclosing transaction hash
    pub tx_hash: B256,
    /// Position of the log within the block
    pub log_index: u64,
    /// Gas used by the enclosing transaction, when the receipt is known
    pub gas_used: Option<U256>,
    /// Gas price of the enclosing transaction, when the receipt is known
    pub gas_price: Option<U256>,
}

/// A decoded event emitted by a pool (pair) contract.
///
/// `Transfer` moves the pool's own accounting token; `Mint` and `Burn`
/// are the pool's confirmation events, distinct from the transfers that
/// precede them.
#[derive(Clone, Debug)]
pub enum PairEvent {
    /// ERC20-style transfer of the pool token
    Transfer {
        /// Sender (zero address on mints)
        from: Address,
        /// Recipient (zero address on burns)
        to: Address,
        /// Pool-token amount in base units
        value: U256,
    },
    /// Authoritative reserve update
    Sync {
        /// New reserve of token0, base units
        reserve0: U256,
        /// New reserve of token1, base units
        reserve1: U256,
    },
    /// Trade confirmation
    Swap {
        /// Address that initiated the swap
        sender: Address,
        /// token0 paid in, base units
        amount0_in: U256,
        /// token1 paid in, base units
        amount1_in: U256,
        /// token0 paid out, base units
        amount0_out: U256,
        /// token1 paid out, base units
        amount1_out: U256,
        /// Recipient of the output
        to: Address,
    },
    /// Liquidity-add confirmation
    Mint {
        /// Address that supplied the liquidity
        sender: Address,
        /// token0 deposited, base units
        amount0: U256,
        /// token1 deposited, base units
        amount1: U256,
    },
    /// Liquidity-remove confirmation
    Burn {
        /// Address that initiated the burn
        sender: Address,
        /// token0 withdrawn, base units
        amount0: U256,
        /// token1 withdrawn, base units
        amount1: U256,
        /// Recipient of the withdrawn tokens
        to: Address,
    },
}

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// One account's live pool-token balance in one pool.
///
/// Deleted outright when the balance returns to exactly zero; the
/// historical snapshots stay behind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiquidityPosition {
    /// `<account>-<pair>`
    pub id: String,
    /// Account entity id
    pub account: String,
    /// Pool entity id
    pub pair: String,
    /// Current pool-token balance, decimal
    pub liquidity_token_balance: BigDecimal,
}

impl Entity for LiquidityPosition {
    const KIND: &'static str = "LiquidityPosition";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Immutable copy of a position and its pool at the moment of a balance
/// change. Append-only; a second adjustment in the same block second
/// overwrites the first snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiquidityPositionSnapshot {
    /// `<positionId>-<blockTimestamp>`
    pub id: String,
    /// Position entity id
    pub position: String,
    /// Block timestamp, seconds
    pub timestamp: u64,
    /// Block number
    pub block: u64,
    /// Account entity id
    pub account: String,
    /// Pool entity id
    pub pair: String,
    /// Position balance after the adjustment
    pub liquidity_token_balance: BigDecimal,
    /// Pool-token total supply at snapshot time
    pub liquidity_token_total_supply: BigDecimal,
    /// Pool reserve of token0 at snapshot time
    pub reserve0: BigDecimal,
    /// Pool reserve of token1 at snapshot time
    pub reserve1: BigDecimal,
    /// Pool reserve USD value at snapshot time
    pub reserve_usd: BigDecimal,
    /// token0 USD price at snapshot time
    pub token0_price_usd: BigDecimal,
    /// token1 USD price at snapshot time
    pub token1_price_usd: BigDecimal,
}

impl Entity for LiquidityPositionSnapshot {
    const KIND: &'static str = "LiquidityPositionSnapshot";

    fn id(&self) -> &str {
        &self.id
    }
}

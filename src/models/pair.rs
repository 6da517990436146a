use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// A two-token liquidity pool.
///
/// `reserve0`/`reserve1` are only ever overwritten by a Sync event;
/// swap, mint, and burn handlers never recompute reserves from deltas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pair {
    /// Pool contract address, lower-case hex
    pub id: String,
    /// Token0 entity id, immutable after creation
    pub token0: String,
    /// Token1 entity id, immutable after creation
    pub token1: String,
    /// Reserve of token0, scaled by its decimals
    pub reserve0: BigDecimal,
    /// Reserve of token1, scaled by its decimals
    pub reserve1: BigDecimal,
    /// Pool-token supply, decimal
    pub total_supply: BigDecimal,
    /// reserve0 / reserve1, zero when reserve1 is zero
    pub token0_price: BigDecimal,
    /// reserve1 / reserve0, zero when reserve0 is zero
    pub token1_price: BigDecimal,
    /// Both reserves valued in the reference currency via derived prices
    pub reserve_ref: BigDecimal,
    /// Reference-currency reserve passing the whitelist trust filter,
    /// zero otherwise
    pub tracked_reserve_ref: BigDecimal,
    /// Reserve value in USD
    pub reserve_usd: BigDecimal,
    /// Cumulative tracked swap volume in USD
    pub volume_usd: BigDecimal,
    /// Cumulative swap volume in token0 units
    pub volume_token0: BigDecimal,
    /// Cumulative swap volume in token1 units
    pub volume_token1: BigDecimal,
    /// Cumulative untracked swap volume in USD
    pub untracked_volume_usd: BigDecimal,
    /// Transactions touching this pool
    pub tx_count: u64,
    /// Distinct liquidity positions ever opened against this pool
    pub liquidity_provider_count: u64,
}

impl Pair {
    /// A fresh pool record with zeroed reserves and statistics.
    #[must_use]
    pub fn new(id: String, token0: String, token1: String) -> Self {
        Self {
            id,
            token0,
            token1,
            reserve0: BigDecimal::default(),
            reserve1: BigDecimal::default(),
            total_supply: BigDecimal::default(),
            token0_price: BigDecimal::default(),
            token1_price: BigDecimal::default(),
            reserve_ref: BigDecimal::default(),
            tracked_reserve_ref: BigDecimal::default(),
            reserve_usd: BigDecimal::default(),
            volume_usd: BigDecimal::default(),
            volume_token0: BigDecimal::default(),
            volume_token1: BigDecimal::default(),
            untracked_volume_usd: BigDecimal::default(),
            tx_count: 0,
            liquidity_provider_count: 0,
        }
    }
}

impl Entity for Pair {
    const KIND: &'static str = "Pair";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Pair-existence index row: `<tokenId>-<whitelistTokenId>` maps to the
/// pool pairing the two. Consulted by the pricing oracle; written at pair
/// registration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairLookup {
    /// `<tokenId>-<whitelistTokenId>`
    pub id: String,
    /// Pool entity id
    pub pair: String,
}

impl Entity for PairLookup {
    const KIND: &'static str = "PairLookup";

    fn id(&self) -> &str {
        &self.id
    }
}

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// Protocol-wide aggregate statistics, one record per factory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Factory {
    /// Factory contract address, lower-case hex
    pub id: String,
    /// Pools registered under this factory
    pub pair_count: u64,
    /// Cumulative tracked swap volume in USD
    pub total_volume_usd: BigDecimal,
    /// Cumulative tracked swap volume in the reference currency
    pub total_volume_ref: BigDecimal,
    /// Cumulative untracked swap volume in USD
    pub untracked_volume_usd: BigDecimal,
    /// Tracked liquidity across all pools, reference currency
    pub total_liquidity_ref: BigDecimal,
    /// Tracked liquidity across all pools, USD
    pub total_liquidity_usd: BigDecimal,
    /// Transactions processed
    pub tx_count: u64,
}

impl Factory {
    /// A fresh factory record with zeroed statistics.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self {
            id,
            pair_count: 0,
            total_volume_usd: BigDecimal::default(),
            total_volume_ref: BigDecimal::default(),
            untracked_volume_usd: BigDecimal::default(),
            total_liquidity_ref: BigDecimal::default(),
            total_liquidity_usd: BigDecimal::default(),
            tx_count: 0,
        }
    }
}

impl Entity for Factory {
    const KIND: &'static str = "Factory";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Singleton record holding the reference currency's USD price.
///
/// Recomputed from the external reference pool on every reserve-changing
/// event. A price of zero means "unknown", not "worthless".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bundle {
    /// Always `"1"`
    pub id: String,
    /// Reference-currency price in USD, zero when unknown
    pub ref_price_usd: BigDecimal,
}

impl Bundle {
    /// The singleton id.
    pub const ID: &'static str = "1";

    /// A fresh bundle with unknown price.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Self::ID.to_string(),
            ref_price_usd: BigDecimal::default(),
        }
    }
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Bundle {
    const KIND: &'static str = "Bundle";

    fn id(&self) -> &str {
        &self.id
    }
}

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// A traded token, created on first observation and never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Contract address, lower-case hex
    pub id: String,
    /// Token symbol
    pub symbol: Option<String>,
    /// Token name
    pub name: Option<String>,
    /// Token decimals
    pub decimals: u32,
    /// Value of one token in the reference currency
    pub derived_ref: BigDecimal,
    /// Cumulative trade volume in token units
    pub trade_volume: BigDecimal,
    /// Cumulative tracked trade volume in USD
    pub trade_volume_usd: BigDecimal,
    /// Cumulative untracked trade volume in USD
    pub untracked_volume_usd: BigDecimal,
    /// Token units held across all pools
    pub total_liquidity: BigDecimal,
    /// Transactions touching this token
    pub tx_count: u64,
}

impl Token {
    /// A fresh token record with zeroed statistics.
    #[must_use]
    pub fn new(id: String, decimals: u32) -> Self {
        Self {
            id,
            symbol: None,
            name: None,
            decimals,
            derived_ref: BigDecimal::default(),
            trade_volume: BigDecimal::default(),
            trade_volume_usd: BigDecimal::default(),
            untracked_volume_usd: BigDecimal::default(),
            total_liquidity: BigDecimal::default(),
            tx_count: 0,
        }
    }
}

impl Entity for Token {
    const KIND: &'static str = "Token";

    fn id(&self) -> &str {
        &self.id
    }
}

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// An externally owned account observed interacting with the exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    /// Account address, lower-case hex
    pub id: String,
    /// Cumulative USD value of swaps delivered to this account
    pub usd_swapped: BigDecimal,
}

impl Account {
    /// A fresh account record.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self {
            id,
            usd_swapped: BigDecimal::default(),
        }
    }
}

impl Entity for Account {
    const KIND: &'static str = "Account";

    fn id(&self) -> &str {
        &self.id
    }
}

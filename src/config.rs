//! Chain deployment configuration.
//!
//! Addresses of the exchange contracts, the pricing whitelist, and the
//! trust thresholds used by the oracle. The defaults carry the production
//! deployment; embedders indexing another deployment load their own values
//! from JSON.

use alloy::primitives::{address, Address, U256};
use bigdecimal::BigDecimal;
use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::utils::ids::address_id;

/// Static metadata for tokens whose on-chain introspection is unreliable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenDefinition {
    /// Token contract address
    pub address: Address,
    /// Token symbol
    pub symbol: String,
    /// Token name
    pub name: String,
    /// Token decimals
    pub decimals: u32,
}

/// Contract addresses and pricing policy for one chain deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// The exchange factory contract
    pub factory: Address,
    /// The wrapped native token used as the pricing anchor
    pub reference_token: Address,
    /// The designated stablecoin
    pub stable_token: Address,
    /// External pool holding the reference token / stablecoin pairing,
    /// read for the reference-currency USD price
    pub reference_pool: Address,
    /// Tokens trusted as pricing references, in lookup order
    pub whitelist: Vec<Address>,
    /// Reserve USD floor applied to pools with fewer than five liquidity
    /// providers before their swap volume is tracked
    pub minimum_usd_threshold_new_pairs: BigDecimal,
    /// Reference-currency reserve a pool must hold before the oracle
    /// prices a token through it
    pub minimum_liquidity_threshold_ref: BigDecimal,
    /// Pool-token amount permanently locked at pool bootstrap, in base
    /// units
    pub minimum_liquidity_lock: U256,
    /// Static token metadata overrides
    pub static_tokens: Vec<TokenDefinition>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        let stable = address!("0xf817257fed379853cDe0fa4F97AB987181B1E5Ea");
        let reference = address!("0x760AfE86e5de5fa0Ee542fc7B7B713e1c5425701");
        Self {
            factory: address!("0x4c4a92931a3f0a4fb369c61fd990efce28b044e7"),
            reference_token: reference,
            stable_token: stable,
            reference_pool: address!("0xEc8eb233538aBFc97f337da8ec3d1b57fbe31895"),
            whitelist: vec![stable, reference],
            minimum_usd_threshold_new_pairs: BigDecimal::from(100),
            minimum_liquidity_threshold_ref: BigDecimal::from(10),
            minimum_liquidity_lock: U256::from(1000),
            static_tokens: vec![TokenDefinition {
                address: address!("0xc70c0da850c8d042a1be575d12f45e4392d9a889"),
                symbol: "MPC".to_string(),
                name: "MrPicule Token".to_string(),
                decimals: 18,
            }],
        }
    }
}

impl ChainConfig {
    /// Load a configuration from a JSON document.
    ///
    /// # Errors
    /// * If the document is not valid JSON or is missing fields
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Entity id of the reference token.
    #[must_use]
    pub fn reference_token_id(&self) -> String {
        address_id(&self.reference_token)
    }

    /// Entity id of the stablecoin.
    #[must_use]
    pub fn stable_token_id(&self) -> String {
        address_id(&self.stable_token)
    }

    /// Whether the token with this entity id is on the pricing whitelist.
    #[must_use]
    pub fn is_whitelisted(&self, token_id: &str) -> bool {
        self.whitelist.iter().any(|w| address_id(w) == token_id)
    }

    /// Decimals for a token, from static definitions when present.
    #[must_use]
    pub fn static_decimals(&self, token: &Address) -> Option<u32> {
        self.static_tokens
            .iter()
            .find(|def| def.address == *token)
            .map(|def| def.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_whitelist_order() {
        let config = ChainConfig::default();
        // The stablecoin is consulted before the reference token.
        assert_eq!(config.whitelist[0], config.stable_token);
        assert_eq!(config.whitelist[1], config.reference_token);
    }

    #[test]
    fn test_is_whitelisted() {
        let config = ChainConfig::default();
        assert!(config.is_whitelisted(&config.stable_token_id()));
        assert!(config.is_whitelisted(&config.reference_token_id()));
        assert!(!config.is_whitelisted("0xc70c0da850c8d042a1be575d12f45e4392d9a889"));
    }

    #[test]
    fn test_from_json_str() {
        let config = ChainConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = ChainConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.factory, config.factory);
        assert_eq!(parsed.whitelist, config.whitelist);
        assert_eq!(
            parsed.minimum_usd_threshold_new_pairs,
            config.minimum_usd_threshold_new_pairs
        );
    }

    #[test]
    fn test_static_decimals() {
        let config = ChainConfig::default();
        let known = config.static_tokens[0].address;
        assert_eq!(config.static_decimals(&known), Some(18));
        assert_eq!(config.static_decimals(&Address::ZERO), None);
    }
}

use alloy::primitives::{Address, B256, U256};
use eyre::{eyre, Result};

use crate::config::ChainConfig;
use crate::events::EventMeta;
use crate::pricing::ReferencePoolReader;
use crate::store::MemoryStore;

use super::Reconciler;

/// Reference pool stub with fixed reserves.
pub(crate) struct StaticReferencePool {
    pub reserve0: u64,
    pub reserve1: u64,
    pub token0: Address,
    pub available: bool,
}

impl ReferencePoolReader for StaticReferencePool {
    fn reserves(&self) -> Result<(U256, U256)> {
        if self.available {
            Ok((U256::from(self.reserve0), U256::from(self.reserve1)))
        } else {
            Err(eyre!("execution reverted"))
        }
    }

    fn token0(&self) -> Result<Address> {
        if self.available {
            Ok(self.token0)
        } else {
            Err(eyre!("execution reverted"))
        }
    }
}

/// Reconciler over an empty store, with the reference pool priced at
/// 2 USD per reference-token unit.
pub(crate) fn reconciler() -> Reconciler<MemoryStore, StaticReferencePool> {
    let config = ChainConfig::default();
    let reference_pool = StaticReferencePool {
        reserve0: 2_000,
        reserve1: 1_000,
        token0: config.stable_token,
        available: true,
    };
    Reconciler::new(config, MemoryStore::new(), reference_pool)
}

/// Same, but the reference pool cannot be read.
pub(crate) fn reconciler_without_reference_pool() -> Reconciler<MemoryStore, StaticReferencePool> {
    let config = ChainConfig::default();
    let reference_pool = StaticReferencePool {
        reserve0: 0,
        reserve1: 0,
        token0: config.stable_token,
        available: false,
    };
    Reconciler::new(config, MemoryStore::new(), reference_pool)
}

/// Deterministic address from a small integer.
pub(crate) fn addr(n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    Address::from(bytes)
}

/// Event metadata for transaction `tx` at `timestamp`.
pub(crate) fn meta(tx: u64, timestamp: u64) -> EventMeta {
    let mut hash = [0u8; 32];
    hash[24..].copy_from_slice(&tx.to_be_bytes());
    EventMeta {
        block_number: timestamp / 2,
        timestamp,
        tx_hash: B256::from(hash),
        log_index: 0,
        gas_used: None,
        gas_price: None,
    }
}

/// Whole token units in 18-decimal base units.
pub(crate) fn units(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10_u64).pow(U256::from(18))
}

//! Entity id construction.
//!
//! Every store id derived from chain data is lower-case `0x`-prefixed hex,
//! regardless of how the address was checksummed upstream.

use alloy::primitives::{Address, B256};

/// Lower-case hex id for a contract or account address.
#[must_use]
pub fn address_id(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Lower-case hex id for a transaction hash.
#[must_use]
pub fn tx_id(hash: &B256) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Id of a liquidity position: `<account>-<pair>`.
#[must_use]
pub fn position_id(account: &str, pair: &str) -> String {
    format!("{account}-{pair}")
}

/// Id of the pair-existence index row for `(token, whitelist token)`.
#[must_use]
pub fn pair_lookup_id(token: &str, whitelist_token: &str) -> String {
    format!("{token}-{whitelist_token}")
}

/// Id of a per-transaction record: `<txHash>-<indexWithinTx>`.
#[must_use]
pub fn record_id(tx: &str, index: usize) -> String {
    format!("{tx}-{index}")
}

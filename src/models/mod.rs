/// Observed externally owned accounts
pub mod account;
/// Protocol-wide aggregates and the reference price bundle
pub mod factory;
/// Liquidity pools and the pair-existence index
pub mod pair;
/// Liquidity positions and their snapshots
pub mod position;
/// Traded tokens
pub mod token;
/// Transactions and the logical mint/burn/swap records
pub mod transaction;

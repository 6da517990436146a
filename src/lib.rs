/*!
 * # Tally - AMM Event Reconciliation and Pricing Engine
 *
 * Tally consumes an ordered stream of decoded on-chain events from an
 * automated-market-maker exchange and maintains a derived analytical
 * state: pool reserves, logical swap/mint/burn history, per-account
 * liquidity positions, and reference-currency/USD pricing for every
 * traded token.
 *
 * ## Core Features
 *
 * - **Event Reconciliation**: Converts raw pool-token transfers into
 *   logical mint/burn/swap records, handling multi-event transactions,
 *   phantom fee mints, and two-phase burns
 * - **Pricing Oracle**: Derives a reference-currency value for every
 *   token through a whitelist graph with liquidity-based trust filters
 * - **Position Ledger**: Tracks per-account pool-token balances with
 *   append-only historical snapshots
 *
 * ## Module Structure
 *
 * - `config`: Chain deployment configuration
 * - `events`: Decoded pool-event input types
 * - `models`: Entity records held in the store
 * - `pricing`: The pricing oracle
 * - `reconcile`: The pool event reconciler
 * - `store`: The entity store seam
 * - `utils`: Numeric conversions, id helpers, logging
 */

/// Chain deployment configuration
pub mod config;
/// Decoded pool-event input types
pub mod events;
/// Entity records held in the store
pub mod models;
/// The pricing oracle
pub mod pricing;
/// The pool event reconciler
pub mod reconcile;
/// The entity store seam
pub mod store;
/// Utility functions and helpers
pub mod utils;

//! The pool event reconciler.
//!
//! Consumes pool-token Transfer events and pool Sync/Swap/Mint/Burn
//! events in log order and maintains the derived analytical state:
//! logical mint/burn/swap records, per-account liquidity positions, and
//! aggregate pool/token/protocol statistics.
//!
//! Processing is strictly sequential. A missing referenced entity (pool,
//! token, bundle) short-circuits the current event as a logged no-op;
//! nothing in here aborts the stream.

/// Liquidity position ledger
pub mod ledger;
/// Mint/Burn confirmation handlers
pub mod mint_burn;
/// Sync (reserve update) handler
pub mod reserves;
/// Swap handler
pub mod swap;
#[cfg(test)]
pub(crate) mod test_helpers;
/// Pool-token transfer state machine
pub mod transfer;

use alloy::primitives::Address;

use crate::config::ChainConfig;
use crate::events::{EventMeta, PairEvent};
use crate::models::account::Account;
use crate::models::factory::{Bundle, Factory};
use crate::models::pair::{Pair, PairLookup};
use crate::models::token::Token;
use crate::models::transaction::Transaction;
use crate::pricing::{self, ReferencePoolReader};
use crate::store::EntityStore;
use crate::utils::ids::{address_id, pair_lookup_id, tx_id};
use crate::utils::numeric::u256_to_decimal;

/// Decimals of the pool's own accounting token.
pub(crate) const POOL_TOKEN_DECIMALS: u32 = 18;

/// Decimals assumed for tokens without a static definition.
const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// The reconciliation engine.
///
/// Owns the entity store, the chain configuration, and the reference-pool
/// reader for the duration of indexing; all state flows through these
/// explicit handles rather than ambient globals.
pub struct Reconciler<S: EntityStore, R: ReferencePoolReader> {
    /// Chain deployment configuration
    pub(crate) config: ChainConfig,
    /// Entity store
    pub(crate) store: S,
    /// External reference pool
    pub(crate) reference_pool: R,
}

impl<S: EntityStore, R: ReferencePoolReader> Reconciler<S, R> {
    /// Build a reconciler over a store and a reference-pool reader.
    pub fn new(config: ChainConfig, store: S, reference_pool: R) -> Self {
        Self {
            config,
            store,
            reference_pool,
        }
    }

    /// The underlying store, for queries after (or between) events.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The chain configuration in use.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Apply one decoded pool event.
    ///
    /// Events must arrive in ascending `(block, transaction, log index)`
    /// order; the handlers rely on that total order for their positional
    /// matching.
    pub fn apply(&mut self, pair_address: Address, event: &PairEvent, meta: &EventMeta) {
        match event {
            PairEvent::Transfer { from, to, value } => {
                self.handle_transfer(pair_address, *from, *to, *value, meta);
            }
            PairEvent::Sync { reserve0, reserve1 } => {
                self.handle_sync(pair_address, *reserve0, *reserve1);
            }
            PairEvent::Swap {
                sender,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                to,
            } => {
                self.handle_swap(
                    pair_address,
                    *sender,
                    *amount0_in,
                    *amount1_in,
                    *amount0_out,
                    *amount1_out,
                    *to,
                    meta,
                );
            }
            PairEvent::Mint {
                sender,
                amount0,
                amount1,
            } => {
                self.handle_mint(pair_address, *sender, *amount0, *amount1, meta);
            }
            PairEvent::Burn {
                sender,
                amount0,
                amount1,
                to,
            } => {
                self.handle_burn(pair_address, *sender, *amount0, *amount1, *to, meta);
            }
        }
    }

    /// Register a newly created pool and its tokens.
    ///
    /// This is the seam the (external) factory mapper feeds: it creates
    /// the token records, the pool record, the pair-existence index rows
    /// consulted by the oracle, and bumps the factory's pair count.
    /// Registering the same pool twice is a logged no-op.
    pub fn register_pair(&mut self, pair: Address, token0: Address, token1: Address) {
        let pair_id = address_id(&pair);
        if self.store.get::<Pair>(&pair_id).is_some() {
            log::warn!("reconcile::register_pair: pool {pair_id} already registered");
            return;
        }

        let token0 = self.get_or_create_token(token0);
        let token1 = self.get_or_create_token(token1);

        self.store.put(Pair::new(
            pair_id.clone(),
            token0.id.clone(),
            token1.id.clone(),
        ));

        // Index rows let the oracle find this pool from either token when
        // the other side is whitelisted.
        for whitelist_token in self.config.whitelist.clone() {
            let whitelist_id = address_id(&whitelist_token);
            if token1.id == whitelist_id {
                self.store.put(PairLookup {
                    id: pair_lookup_id(&token0.id, &whitelist_id),
                    pair: pair_id.clone(),
                });
            }
            if token0.id == whitelist_id {
                self.store.put(PairLookup {
                    id: pair_lookup_id(&token1.id, &whitelist_id),
                    pair: pair_id.clone(),
                });
            }
        }

        let mut factory = self.get_or_create_factory();
        factory.pair_count += 1;
        self.store.put(factory);

        log::info!(
            "reconcile::register_pair: registered pool {} ({} / {})",
            pair_id,
            token0.id,
            token1.id
        );
    }

    /// Load the transaction record for this event, creating it on first
    /// touch with empty mint/burn/swap queues.
    pub(crate) fn get_or_create_transaction(&mut self, meta: &EventMeta) -> Transaction {
        let id = tx_id(&meta.tx_hash);
        if let Some(transaction) = self.store.get::<Transaction>(&id) {
            return transaction;
        }

        let transaction = Transaction {
            id,
            block_number: meta.block_number,
            timestamp: meta.timestamp,
            gas_used: meta.gas_used.map(u256_to_decimal).unwrap_or_default(),
            gas_price: meta.gas_price.map(u256_to_decimal).unwrap_or_default(),
            mints: crate::models::transaction::RecordQueue::default(),
            burns: crate::models::transaction::RecordQueue::default(),
            swaps: crate::models::transaction::RecordQueue::default(),
        };
        self.store.put(transaction.clone());
        transaction
    }

    /// Load an account record, creating it on first observation.
    pub(crate) fn get_or_create_account(&mut self, address: Address) -> Account {
        let id = address_id(&address);
        if let Some(account) = self.store.get::<Account>(&id) {
            return account;
        }

        let account = Account::new(id);
        self.store.put(account.clone());
        account
    }

    /// Load a token record, creating it with static metadata when known.
    pub(crate) fn get_or_create_token(&mut self, address: Address) -> Token {
        let id = address_id(&address);
        if let Some(token) = self.store.get::<Token>(&id) {
            return token;
        }

        let decimals = self
            .config
            .static_decimals(&address)
            .unwrap_or(DEFAULT_TOKEN_DECIMALS);
        let mut token = Token::new(id, decimals);
        if let Some(def) = self
            .config
            .static_tokens
            .iter()
            .find(|def| def.address == address)
        {
            token.symbol = Some(def.symbol.clone());
            token.name = Some(def.name.clone());
        }
        self.store.put(token.clone());
        token
    }

    /// Load the factory aggregate, creating it when absent.
    pub(crate) fn get_or_create_factory(&mut self) -> Factory {
        let id = address_id(&self.config.factory);
        if let Some(factory) = self.store.get::<Factory>(&id) {
            return factory;
        }

        let factory = Factory::new(id);
        self.store.put(factory.clone());
        factory
    }

    /// Recompute the reference price from the external pool and persist
    /// the bundle.
    pub(crate) fn refresh_bundle(&mut self) -> Bundle {
        let mut bundle = self
            .store
            .get::<Bundle>(Bundle::ID)
            .unwrap_or_else(Bundle::new);
        bundle.ref_price_usd = pricing::ref_price_in_usd(&self.reference_pool, &self.config);
        self.store.put(bundle.clone());
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::{
        addr, meta, reconciler, reconciler_without_reference_pool, units,
    };
    use super::*;
    use crate::models::position::{LiquidityPosition, LiquidityPositionSnapshot};
    use crate::models::transaction::{BurnRecord, MintRecord, SwapRecord};
    use alloy::primitives::U256;
    use bigdecimal::BigDecimal;

    /// Registers a pool pairing an unlisted token with the reference
    /// token and returns `(pool, token, reference)` addresses.
    fn register_test_pool(
        recon: &mut Reconciler<
            crate::store::MemoryStore,
            super::test_helpers::StaticReferencePool,
        >,
    ) -> (Address, Address, Address) {
        let pool = addr(0xF00);
        let token = addr(0xAA);
        let reference = recon.config().reference_token;
        recon.register_pair(pool, token, reference);
        (pool, token, reference)
    }

    /// Applies the Sync that seeds reserves 1000 / 2000 and warms the
    /// derived prices (the first Sync prices against the pool's previous,
    /// empty reserve).
    fn seed_reserves(
        recon: &mut Reconciler<
            crate::store::MemoryStore,
            super::test_helpers::StaticReferencePool,
        >,
        pool: Address,
    ) {
        let sync = PairEvent::Sync {
            reserve0: units(1_000),
            reserve1: units(2_000),
        };
        recon.apply(pool, &sync, &meta(1, 100));
        recon.apply(pool, &sync, &meta(2, 110));
    }

    #[test]
    fn test_register_pair_creates_index_and_counts() {
        let mut recon = reconciler();
        let (pool, token, reference) = register_test_pool(&mut recon);

        let pool_id = address_id(&pool);
        let token_id = address_id(&token);
        let reference_id = address_id(&reference);

        let pair: Pair = recon.store().get(&pool_id).unwrap();
        assert_eq!(pair.token0, token_id);
        assert_eq!(pair.token1, reference_id);

        // The oracle can find this pool from the unlisted token.
        let lookup: PairLookup = recon
            .store()
            .get(&pair_lookup_id(&token_id, &reference_id))
            .unwrap();
        assert_eq!(lookup.pair, pool_id);

        let factory: Factory = recon
            .store()
            .get(&address_id(&recon.config().factory))
            .unwrap();
        assert_eq!(factory.pair_count, 1);

        // Registering again changes nothing.
        recon.register_pair(pool, token, reference);
        let factory: Factory = recon
            .store()
            .get(&address_id(&recon.config().factory))
            .unwrap();
        assert_eq!(factory.pair_count, 1);
    }

    #[test]
    fn test_bootstrap_lock_transfer_is_ignored() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);

        let lock = recon.config().minimum_liquidity_lock;
        let transfer = PairEvent::Transfer {
            from: Address::ZERO,
            to: addr(0x11),
            value: lock,
        };
        recon.apply(pool, &transfer, &meta(5, 100));

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        assert_eq!(pair.total_supply, BigDecimal::from(0));
        assert_eq!(recon.store().count_kind("Transaction"), 0);
        assert_eq!(recon.store().count_kind("Mint"), 0);
        assert_eq!(recon.store().count_kind("LiquidityPosition"), 0);
    }

    #[test]
    fn test_mint_transfer_creates_provisional_mint() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let lp = addr(0x11);

        let transfer = PairEvent::Transfer {
            from: Address::ZERO,
            to: lp,
            value: units(5),
        };
        let event_meta = meta(5, 100);
        recon.apply(pool, &transfer, &event_meta);

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        assert_eq!(pair.total_supply, BigDecimal::from(5));
        assert_eq!(pair.liquidity_provider_count, 1);

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&event_meta.tx_hash))
            .unwrap();
        assert_eq!(transaction.mints.len(), 1);

        let mint: MintRecord = recon.store().get(transaction.mints.last().unwrap()).unwrap();
        assert!(!mint.is_complete());
        assert_eq!(mint.to, address_id(&lp));
        assert_eq!(mint.liquidity, BigDecimal::from(5));

        let position: LiquidityPosition = recon
            .store()
            .get(&crate::utils::ids::position_id(
                &address_id(&lp),
                &address_id(&pool),
            ))
            .unwrap();
        assert_eq!(position.liquidity_token_balance, BigDecimal::from(5));
        assert_eq!(recon.store().count_kind("LiquidityPositionSnapshot"), 1);
    }

    #[test]
    fn test_repeated_mint_transfers_share_one_record() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let lp = addr(0x11);
        let event_meta = meta(5, 100);

        // Two mint-path transfers with no Mint confirmation in between:
        // the second one must not open another logical mint.
        for _ in 0..2 {
            let transfer = PairEvent::Transfer {
                from: Address::ZERO,
                to: lp,
                value: units(5),
            };
            recon.apply(pool, &transfer, &event_meta);
        }

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        assert_eq!(pair.total_supply, BigDecimal::from(10));

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&event_meta.tx_hash))
            .unwrap();
        assert_eq!(transaction.mints.len(), 1);
    }

    #[test]
    fn test_mint_confirmation_completes_tail_record() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        seed_reserves(&mut recon, pool);
        let lp = addr(0x11);
        let event_meta = meta(5, 200);

        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: lp,
                value: units(5),
            },
            &event_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Mint {
                sender: lp,
                amount0: units(100),
                amount1: units(200),
            },
            &event_meta,
        );

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&event_meta.tx_hash))
            .unwrap();
        let mint: MintRecord = recon.store().get(transaction.mints.last().unwrap()).unwrap();
        assert!(mint.is_complete());
        assert_eq!(mint.sender, Some(address_id(&lp)));
        assert_eq!(mint.amount0, Some(BigDecimal::from(100)));
        assert_eq!(mint.amount1, Some(BigDecimal::from(200)));
        // 100 token0 at derived 2 plus 200 reference at 1, times 2 USD.
        assert_eq!(mint.amount_usd, Some(BigDecimal::from(800)));

        // A further mint transfer now opens a second logical mint.
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: lp,
                value: units(3),
            },
            &event_meta,
        );
        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&event_meta.tx_hash))
            .unwrap();
        assert_eq!(transaction.mints.len(), 2);
    }

    #[test]
    fn test_mint_confirmation_without_placeholder_is_dropped() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        seed_reserves(&mut recon, pool);

        recon.apply(
            pool,
            &PairEvent::Mint {
                sender: addr(0x11),
                amount0: units(1),
                amount1: units(1),
            },
            &meta(5, 200),
        );

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        // Counters untouched by the dropped confirmation.
        assert_eq!(pair.tx_count, 0);
        assert_eq!(recon.store().count_kind("Mint"), 0);
    }

    #[test]
    fn test_two_phase_burn_reuses_staged_record() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let lp = addr(0x11);

        // Fund the LP with 5 pool tokens, confirmed.
        let fund_meta = meta(5, 100);
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: lp,
                value: units(5),
            },
            &fund_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Mint {
                sender: lp,
                amount0: units(10),
                amount1: units(20),
            },
            &fund_meta,
        );

        // Stage then finalize in a later transaction.
        let burn_meta = meta(6, 200);
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: lp,
                to: pool,
                value: units(5),
            },
            &burn_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: pool,
                to: Address::ZERO,
                value: units(5),
            },
            &burn_meta,
        );

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&burn_meta.tx_hash))
            .unwrap();
        assert_eq!(transaction.burns.len(), 1);

        let burn: BurnRecord = recon.store().get(transaction.burns.last().unwrap()).unwrap();
        assert_eq!(burn.sender, Some(address_id(&lp)));
        assert_eq!(burn.liquidity, BigDecimal::from(5));
        assert!(burn.needs_complete);

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        assert_eq!(pair.total_supply, BigDecimal::from(0));

        // The LP's balance went back to zero and the position is gone.
        let position_id =
            crate::utils::ids::position_id(&address_id(&lp), &address_id(&pool));
        assert!(recon
            .store()
            .get::<LiquidityPosition>(&position_id)
            .is_none());
    }

    #[test]
    fn test_finalize_without_stage_creates_fresh_burn() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let event_meta = meta(6, 200);

        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: pool,
                to: Address::ZERO,
                value: units(5),
            },
            &event_meta,
        );

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&event_meta.tx_hash))
            .unwrap();
        assert_eq!(transaction.burns.len(), 1);

        let burn: BurnRecord = recon.store().get(transaction.burns.last().unwrap()).unwrap();
        assert!(!burn.needs_complete);
        assert_eq!(burn.sender, None);
        assert_eq!(burn.liquidity, BigDecimal::from(5));
        // No staged sender, so no position was touched.
        assert_eq!(recon.store().count_kind("LiquidityPosition"), 0);
    }

    #[test]
    fn test_fee_mint_absorbed_into_burn() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let lp = addr(0x11);
        let fee_to = addr(0xFE);

        // Fund the LP first (separate transaction, confirmed).
        let fund_meta = meta(5, 100);
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: lp,
                value: units(5),
            },
            &fund_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Mint {
                sender: lp,
                amount0: units(10),
                amount1: units(20),
            },
            &fund_meta,
        );

        // Burn transaction: stage, then the protocol mints collected
        // fees to the fee recipient, then the burn finalizes. The fee
        // mint never gets a Mint confirmation.
        let burn_meta = meta(6, 200);
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: lp,
                to: pool,
                value: units(5),
            },
            &burn_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: fee_to,
                value: units(1),
            },
            &burn_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: pool,
                to: Address::ZERO,
                value: units(5),
            },
            &burn_meta,
        );

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&burn_meta.tx_hash))
            .unwrap();
        // The phantom mint is gone from the queue and the store.
        assert!(transaction.mints.is_empty());
        assert_eq!(recon.store().count_kind("Mint"), 1); // the funded one

        let burn: BurnRecord = recon.store().get(transaction.burns.last().unwrap()).unwrap();
        assert_eq!(burn.fee_to, Some(address_id(&fee_to)));
        assert_eq!(burn.fee_liquidity, Some(BigDecimal::from(1)));
        assert_eq!(burn.sender, Some(address_id(&lp)));

        // The fee recipient keeps the minted pool tokens.
        let fee_position: LiquidityPosition = recon
            .store()
            .get(&crate::utils::ids::position_id(
                &address_id(&fee_to),
                &address_id(&pool),
            ))
            .unwrap();
        assert_eq!(fee_position.liquidity_token_balance, BigDecimal::from(1));
    }

    #[test]
    fn test_burn_confirmation_completes_tail_record() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        seed_reserves(&mut recon, pool);
        let lp = addr(0x11);

        let fund_meta = meta(5, 200);
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: lp,
                value: units(5),
            },
            &fund_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Mint {
                sender: lp,
                amount0: units(10),
                amount1: units(20),
            },
            &fund_meta,
        );

        let burn_meta = meta(6, 300);
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: lp,
                to: pool,
                value: units(5),
            },
            &burn_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: pool,
                to: Address::ZERO,
                value: units(5),
            },
            &burn_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Burn {
                sender: lp,
                amount0: units(10),
                amount1: units(20),
                to: lp,
            },
            &burn_meta,
        );

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&burn_meta.tx_hash))
            .unwrap();
        let burn: BurnRecord = recon.store().get(transaction.burns.last().unwrap()).unwrap();
        assert_eq!(burn.amount0, Some(BigDecimal::from(10)));
        assert_eq!(burn.amount1, Some(BigDecimal::from(20)));
        // 10 token0 at derived 2 plus 20 reference at 1, times 2 USD.
        assert_eq!(burn.amount_usd, Some(BigDecimal::from(80)));
    }

    #[test]
    fn test_ordinary_transfer_moves_balance_between_wallets() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let lp = addr(0x11);
        let other = addr(0x22);

        let fund_meta = meta(5, 100);
        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: lp,
                value: units(5),
            },
            &fund_meta,
        );
        recon.apply(
            pool,
            &PairEvent::Mint {
                sender: lp,
                amount0: units(10),
                amount1: units(20),
            },
            &fund_meta,
        );

        recon.apply(
            pool,
            &PairEvent::Transfer {
                from: lp,
                to: other,
                value: units(5),
            },
            &meta(6, 200),
        );

        let pool_id = address_id(&pool);
        // Sender emptied out and was deleted; recipient holds the lot.
        assert!(recon
            .store()
            .get::<LiquidityPosition>(&crate::utils::ids::position_id(
                &address_id(&lp),
                &pool_id
            ))
            .is_none());
        let position: LiquidityPosition = recon
            .store()
            .get(&crate::utils::ids::position_id(&address_id(&other), &pool_id))
            .unwrap();
        assert_eq!(position.liquidity_token_balance, BigDecimal::from(5));

        // No logical record for a wallet-to-wallet move.
        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&meta(6, 200).tx_hash))
            .unwrap();
        assert!(transaction.mints.is_empty());
        assert!(transaction.burns.is_empty());

        let pair: Pair = recon.store().get(&pool_id).unwrap();
        assert_eq!(pair.total_supply, BigDecimal::from(5));
        assert_eq!(pair.liquidity_provider_count, 2);
    }

    #[test]
    fn test_position_zeroed_leaves_two_snapshots() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let account = address_id(&addr(0x11));
        let pool_id = address_id(&pool);

        recon.adjust_position(&account, &pool_id, BigDecimal::from(5), &meta(5, 100));
        recon.adjust_position(&account, &pool_id, BigDecimal::from(-5), &meta(6, 200));

        assert!(recon
            .store()
            .get::<LiquidityPosition>(&crate::utils::ids::position_id(&account, &pool_id))
            .is_none());
        assert_eq!(recon.store().count_kind("LiquidityPositionSnapshot"), 2);

        let final_snapshot: LiquidityPositionSnapshot = recon
            .store()
            .get(&format!(
                "{}-200",
                crate::utils::ids::position_id(&account, &pool_id)
            ))
            .unwrap();
        assert_eq!(
            final_snapshot.liquidity_token_balance,
            BigDecimal::from(0)
        );
    }

    #[test]
    fn test_same_timestamp_snapshot_overwrites() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);
        let account = address_id(&addr(0x11));
        let pool_id = address_id(&pool);

        recon.adjust_position(&account, &pool_id, BigDecimal::from(5), &meta(5, 100));
        recon.adjust_position(&account, &pool_id, BigDecimal::from(1), &meta(5, 100));

        assert_eq!(recon.store().count_kind("LiquidityPositionSnapshot"), 1);
        let snapshot: LiquidityPositionSnapshot = recon
            .store()
            .get(&format!(
                "{}-100",
                crate::utils::ids::position_id(&account, &pool_id)
            ))
            .unwrap();
        assert_eq!(snapshot.liquidity_token_balance, BigDecimal::from(6));
    }

    #[test]
    fn test_sync_prices_pool_against_reference() {
        let mut recon = reconciler();
        let (pool, token, _) = register_test_pool(&mut recon);
        seed_reserves(&mut recon, pool);

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        assert_eq!(pair.reserve0, BigDecimal::from(1_000));
        assert_eq!(pair.reserve1, BigDecimal::from(2_000));
        // 2000 reference units back 1000 token units.
        assert_eq!(pair.token1_price, BigDecimal::from(2));

        let token0: Token = recon.store().get(&address_id(&token)).unwrap();
        assert_eq!(token0.derived_ref, BigDecimal::from(2));
        let reference: Token = recon
            .store()
            .get(&recon.config().reference_token_id())
            .unwrap();
        assert_eq!(reference.derived_ref, BigDecimal::from(1));

        let bundle: Bundle = recon.store().get(Bundle::ID).unwrap();
        assert_eq!(bundle.ref_price_usd, BigDecimal::from(2));

        // (1000 * 2 + 2000 * 1) reference units, at 2 USD each.
        assert_eq!(pair.reserve_ref, BigDecimal::from(4_000));
        assert_eq!(pair.reserve_usd, BigDecimal::from(8_000));
        // Only the reference side is whitelisted: double it, in USD,
        // then back into reference units.
        assert_eq!(pair.tracked_reserve_ref, BigDecimal::from(4_000));

        let factory: Factory = recon
            .store()
            .get(&address_id(&recon.config().factory))
            .unwrap();
        assert_eq!(factory.total_liquidity_ref, BigDecimal::from(4_000));
        assert_eq!(factory.total_liquidity_usd, BigDecimal::from(8_000));

        let token0_after: Token = recon.store().get(&address_id(&token)).unwrap();
        assert_eq!(token0_after.total_liquidity, BigDecimal::from(1_000));
    }

    #[test]
    fn test_sync_with_unreadable_reference_pool_degrades_to_zero() {
        let mut recon = reconciler_without_reference_pool();
        let (pool, token, _) = register_test_pool(&mut recon);
        seed_reserves(&mut recon, pool);

        let bundle: Bundle = recon.store().get(Bundle::ID).unwrap();
        assert_eq!(bundle.ref_price_usd, BigDecimal::from(0));

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        // Reserves still land; only the USD figures degrade.
        assert_eq!(pair.reserve0, BigDecimal::from(1_000));
        assert_eq!(pair.reserve_usd, BigDecimal::from(0));
        assert_eq!(pair.tracked_reserve_ref, BigDecimal::from(0));

        // The token still got a derived price through the whitelist
        // graph; it is the USD leg that is unknown.
        let token0: Token = recon.store().get(&address_id(&token)).unwrap();
        assert_eq!(token0.derived_ref, BigDecimal::from(2));
    }

    #[test]
    fn test_swap_rolls_volume_and_appends_record() {
        let mut recon = reconciler();
        let (pool, token, _) = register_test_pool(&mut recon);
        seed_reserves(&mut recon, pool);

        let trader = addr(0x51);
        let recipient = addr(0x52);
        let swap_meta = meta(7, 500);
        recon.apply(
            pool,
            &PairEvent::Swap {
                sender: trader,
                amount0_in: units(10),
                amount1_in: U256::ZERO,
                amount0_out: U256::ZERO,
                amount1_out: units(20),
                to: recipient,
            },
            &swap_meta,
        );

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        assert_eq!(pair.volume_token0, BigDecimal::from(10));
        assert_eq!(pair.volume_token1, BigDecimal::from(20));
        // Tracked: only the reference side counts, 20 units at 2 USD.
        assert_eq!(pair.volume_usd, BigDecimal::from(40));
        // Untracked: both sides average to 20 reference units, 40 USD.
        assert_eq!(pair.untracked_volume_usd, BigDecimal::from(40));
        assert_eq!(pair.tx_count, 1);

        let token0: Token = recon.store().get(&address_id(&token)).unwrap();
        assert_eq!(token0.trade_volume, BigDecimal::from(10));
        assert_eq!(token0.trade_volume_usd, BigDecimal::from(40));
        assert_eq!(token0.tx_count, 1);

        let factory: Factory = recon
            .store()
            .get(&address_id(&recon.config().factory))
            .unwrap();
        assert_eq!(factory.total_volume_usd, BigDecimal::from(40));
        assert_eq!(factory.total_volume_ref, BigDecimal::from(20));
        assert_eq!(factory.tx_count, 1);

        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&swap_meta.tx_hash))
            .unwrap();
        assert_eq!(transaction.swaps.len(), 1);

        let swap: SwapRecord = recon.store().get(transaction.swaps.last().unwrap()).unwrap();
        assert_eq!(swap.amount0_in, BigDecimal::from(10));
        assert_eq!(swap.amount1_out, BigDecimal::from(20));
        assert_eq!(swap.amount_usd, BigDecimal::from(40));

        let account: Account = recon.store().get(&address_id(&recipient)).unwrap();
        assert_eq!(account.usd_swapped, BigDecimal::from(40));
    }

    #[test]
    fn test_swap_on_thin_pool_falls_back_to_untracked_value() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);

        // Reserves small enough that the whitelisted side's doubled
        // value (20 * 2 * 2 = 80 USD) sits under the 100 USD floor.
        let sync = PairEvent::Sync {
            reserve0: units(10),
            reserve1: units(20),
        };
        recon.apply(pool, &sync, &meta(1, 100));
        recon.apply(pool, &sync, &meta(2, 110));

        let swap_meta = meta(7, 500);
        recon.apply(
            pool,
            &PairEvent::Swap {
                sender: addr(0x51),
                amount0_in: units(1),
                amount1_in: U256::ZERO,
                amount0_out: U256::ZERO,
                amount1_out: units(2),
                to: addr(0x52),
            },
            &swap_meta,
        );

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        // Tracked volume is suppressed by the thin-pool floor.
        assert_eq!(pair.volume_usd, BigDecimal::from(0));
        assert_eq!(pair.untracked_volume_usd, BigDecimal::from(4));

        // The swap record falls back to the untracked estimate.
        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&swap_meta.tx_hash))
            .unwrap();
        let swap: SwapRecord = recon.store().get(transaction.swaps.last().unwrap()).unwrap();
        assert_eq!(swap.amount_usd, BigDecimal::from(4));
    }

    #[test]
    fn test_swap_before_any_sync_is_dropped() {
        let mut recon = reconciler();
        let (pool, ..) = register_test_pool(&mut recon);

        let swap_meta = meta(7, 500);
        recon.apply(
            pool,
            &PairEvent::Swap {
                sender: addr(0x51),
                amount0_in: units(10),
                amount1_in: U256::ZERO,
                amount0_out: U256::ZERO,
                amount1_out: units(20),
                to: addr(0x52),
            },
            &swap_meta,
        );

        // No price bundle yet: the swap leaves no trace beyond the
        // transaction shell.
        let transaction: Transaction = recon
            .store()
            .get(&tx_id(&swap_meta.tx_hash))
            .unwrap();
        assert!(transaction.swaps.is_empty());

        let pair: Pair = recon.store().get(&address_id(&pool)).unwrap();
        assert_eq!(pair.volume_usd, BigDecimal::from(0));
        assert_eq!(pair.tx_count, 0);
    }

    #[test]
    fn test_events_for_unregistered_pool_are_dropped() {
        let mut recon = reconciler();
        let stranger = addr(0xDEAD);

        recon.apply(
            stranger,
            &PairEvent::Transfer {
                from: Address::ZERO,
                to: addr(0x11),
                value: units(5),
            },
            &meta(5, 100),
        );
        recon.apply(
            stranger,
            &PairEvent::Sync {
                reserve0: units(1),
                reserve1: units(1),
            },
            &meta(5, 100),
        );

        assert_eq!(recon.store().count_kind("Pair"), 0);
        assert_eq!(recon.store().count_kind("Mint"), 0);
        assert_eq!(recon.store().count_kind("LiquidityPosition"), 0);
    }
}

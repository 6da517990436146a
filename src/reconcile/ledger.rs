//! The liquidity position ledger.
//!
//! Every pool-token balance change lands here: the live position record
//! is adjusted (and deleted when it returns to exactly zero), and an
//! immutable snapshot of the position and its pool is appended. Snapshots
//! outlive their position.

use bigdecimal::{BigDecimal, Zero};

use crate::events::EventMeta;
use crate::models::pair::Pair;
use crate::models::position::{LiquidityPosition, LiquidityPositionSnapshot};
use crate::models::token::Token;
use crate::pricing::ReferencePoolReader;
use crate::store::EntityStore;
use crate::utils::ids::position_id;

use super::Reconciler;

impl<S: EntityStore, R: ReferencePoolReader> Reconciler<S, R> {
    /// Apply a pool-token balance delta to one account's position.
    ///
    /// Creates the position on first touch (counting a new liquidity
    /// provider on the pool), deletes it when the balance lands on
    /// exactly zero, and writes a snapshot either way. Two adjustments
    /// at the same block timestamp overwrite one snapshot; that loss is
    /// accepted.
    pub(crate) fn adjust_position(
        &mut self,
        account_id: &str,
        pair_id: &str,
        delta: BigDecimal,
        meta: &EventMeta,
    ) {
        let Some(mut pair) = self.store.get::<Pair>(pair_id) else {
            log::debug!("reconcile::ledger: position change on unknown pool {pair_id}, dropped");
            return;
        };

        let id = position_id(account_id, pair_id);
        let mut position = match self.store.get::<LiquidityPosition>(&id) {
            Some(position) => position,
            None => {
                pair.liquidity_provider_count += 1;
                self.store.put(pair.clone());
                LiquidityPosition {
                    id: id.clone(),
                    account: account_id.to_string(),
                    pair: pair_id.to_string(),
                    liquidity_token_balance: BigDecimal::zero(),
                }
            }
        };

        position.liquidity_token_balance = &position.liquidity_token_balance + &delta;

        if position.liquidity_token_balance.is_zero() {
            self.store.delete::<LiquidityPosition>(&id);
        } else {
            self.store.put(position.clone());
        }

        self.write_snapshot(&position, &pair, meta);
    }

    /// Append the immutable snapshot for a just-adjusted position.
    fn write_snapshot(&mut self, position: &LiquidityPosition, pair: &Pair, meta: &EventMeta) {
        let bundle = self.refresh_bundle();

        let Some(token0) = self.store.get::<Token>(&pair.token0) else {
            return;
        };
        let Some(token1) = self.store.get::<Token>(&pair.token1) else {
            return;
        };

        self.store.put(LiquidityPositionSnapshot {
            id: format!("{}-{}", position.id, meta.timestamp),
            position: position.id.clone(),
            timestamp: meta.timestamp,
            block: meta.block_number,
            account: position.account.clone(),
            pair: position.pair.clone(),
            liquidity_token_balance: position.liquidity_token_balance.clone(),
            liquidity_token_total_supply: pair.total_supply.clone(),
            reserve0: pair.reserve0.clone(),
            reserve1: pair.reserve1.clone(),
            reserve_usd: pair.reserve_usd.clone(),
            token0_price_usd: &token0.derived_ref * &bundle.ref_price_usd,
            token1_price_usd: &token1.derived_ref * &bundle.ref_price_usd,
        });
    }
}

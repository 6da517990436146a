//! Sync handling: the authoritative reserve update.
//!
//! Sync is the only event allowed to write pool reserves. It also
//! refreshes the reference price and both tokens' derived prices before
//! recomputing tracked liquidity, because tracked liquidity is valued
//! with those prices. Global and per-token liquidity totals are rolled
//! forward by subtracting the pool's old contribution and adding the new
//! one.

use alloy::primitives::{Address, U256};
use bigdecimal::Zero;

use crate::models::pair::Pair;
use crate::models::token::Token;
use crate::pricing::{self, ReferencePoolReader};
use crate::store::EntityStore;
use crate::utils::ids::address_id;
use crate::utils::numeric::{convert_token_to_decimal, zero};

use super::Reconciler;

impl<S: EntityStore, R: ReferencePoolReader> Reconciler<S, R> {
    /// Handle a Sync event.
    pub(crate) fn handle_sync(&mut self, pair_address: Address, reserve0: U256, reserve1: U256) {
        let pair_id = address_id(&pair_address);
        let Some(mut pair) = self.store.get::<Pair>(&pair_id) else {
            log::debug!("reconcile::reserves: sync from unregistered pool {pair_id}, dropped");
            return;
        };
        let Some(mut token0) = self.store.get::<Token>(&pair.token0) else {
            return;
        };
        let Some(mut token1) = self.store.get::<Token>(&pair.token1) else {
            return;
        };
        let factory_id = address_id(&self.config.factory);
        let Some(mut factory) = self.store.get::<crate::models::factory::Factory>(&factory_id)
        else {
            log::debug!("reconcile::reserves: no factory record, dropped");
            return;
        };

        // Back out this pool's previous contribution to the running
        // totals before overwriting its reserves.
        factory.total_liquidity_ref = &factory.total_liquidity_ref - &pair.tracked_reserve_ref;
        token0.total_liquidity = &token0.total_liquidity - &pair.reserve0;
        token1.total_liquidity = &token1.total_liquidity - &pair.reserve1;

        pair.reserve0 = convert_token_to_decimal(reserve0, token0.decimals);
        pair.reserve1 = convert_token_to_decimal(reserve1, token1.decimals);
        pair.token0_price = pricing::safe_div(&pair.reserve0, &pair.reserve1);
        pair.token1_price = pricing::safe_div(&pair.reserve1, &pair.reserve0);
        self.store.put(pair.clone());

        // Reserves moved, so the reference price and both derived prices
        // are stale. Refresh them before valuing tracked liquidity.
        let bundle = self.refresh_bundle();

        token0.derived_ref = pricing::find_ref_price_per_token(&self.store, &self.config, &token0);
        token1.derived_ref = pricing::find_ref_price_per_token(&self.store, &self.config, &token1);
        self.store.put(token0.clone());
        self.store.put(token1.clone());

        let tracked_liquidity_ref = if bundle.ref_price_usd.is_zero() {
            zero()
        } else {
            pricing::tracked_liquidity_usd(
                &self.store,
                &self.config,
                &pair.reserve0,
                &token0,
                &pair.reserve1,
                &token1,
            ) / &bundle.ref_price_usd
        };

        pair.tracked_reserve_ref = tracked_liquidity_ref.clone();
        pair.reserve_ref =
            &pair.reserve0 * &token0.derived_ref + &pair.reserve1 * &token1.derived_ref;
        pair.reserve_usd = &pair.reserve_ref * &bundle.ref_price_usd;

        factory.total_liquidity_ref = &factory.total_liquidity_ref + &tracked_liquidity_ref;
        factory.total_liquidity_usd = &factory.total_liquidity_ref * &bundle.ref_price_usd;

        token0.total_liquidity = &token0.total_liquidity + &pair.reserve0;
        token1.total_liquidity = &token1.total_liquidity + &pair.reserve1;

        self.store.put(pair);
        self.store.put(factory);
        self.store.put(token0);
        self.store.put(token1);
    }
}

//! Mint and Burn confirmation handling.
//!
//! The pool's own Mint/Burn events complete the provisional records the
//! preceding transfers created. Matching is positional: the event stream
//! guarantees the placeholder sits at the tail of the transaction's
//! queue. A confirmation with no placeholder is dropped, not raised.

use alloy::primitives::{Address, U256};

use crate::events::EventMeta;
use crate::models::factory::Factory;
use crate::models::pair::Pair;
use crate::models::token::Token;
use crate::models::transaction::{BurnRecord, MintRecord};
use crate::pricing::ReferencePoolReader;
use crate::store::EntityStore;
use crate::utils::ids::address_id;
use crate::utils::numeric::convert_token_to_decimal;

use super::Reconciler;

impl<S: EntityStore, R: ReferencePoolReader> Reconciler<S, R> {
    /// Handle a Mint confirmation.
    pub(crate) fn handle_mint(
        &mut self,
        pair_address: Address,
        sender: Address,
        amount0: U256,
        amount1: U256,
        meta: &EventMeta,
    ) {
        let transaction = self.get_or_create_transaction(meta);
        let Some(mint_id) = transaction.mints.last().map(str::to_string) else {
            log::debug!(
                "reconcile::mint_burn: mint confirmation without placeholder in {}, dropped",
                transaction.id
            );
            return;
        };
        let Some(mut mint) = self.store.get::<MintRecord>(&mint_id) else {
            return;
        };

        let pair_id = address_id(&pair_address);
        let Some(mut pair) = self.store.get::<Pair>(&pair_id) else {
            return;
        };
        let Some(mut token0) = self.store.get::<Token>(&pair.token0) else {
            return;
        };
        let Some(mut token1) = self.store.get::<Token>(&pair.token1) else {
            return;
        };
        let factory_id = address_id(&self.config.factory);
        let Some(mut factory) = self.store.get::<Factory>(&factory_id) else {
            return;
        };

        // Reserves themselves are Sync's job; this only values the
        // deposit and bumps counters.
        let token0_amount = convert_token_to_decimal(amount0, token0.decimals);
        let token1_amount = convert_token_to_decimal(amount1, token1.decimals);

        token0.tx_count += 1;
        token1.tx_count += 1;

        let bundle = self.refresh_bundle();
        let amount_total_usd = (&token1.derived_ref * &token1_amount
            + &token0.derived_ref * &token0_amount)
            * &bundle.ref_price_usd;

        pair.tx_count += 1;
        factory.tx_count += 1;

        self.store.put(token0);
        self.store.put(token1);
        self.store.put(pair);
        self.store.put(factory);

        mint.sender = Some(address_id(&sender));
        mint.amount0 = Some(token0_amount);
        mint.amount1 = Some(token1_amount);
        mint.log_index = Some(meta.log_index);
        mint.amount_usd = Some(amount_total_usd);
        self.store.put(mint);
    }

    /// Handle a Burn confirmation.
    pub(crate) fn handle_burn(
        &mut self,
        pair_address: Address,
        sender: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
        meta: &EventMeta,
    ) {
        let transaction = self.get_or_create_transaction(meta);
        let Some(burn_id) = transaction.burns.last().map(str::to_string) else {
            log::debug!(
                "reconcile::mint_burn: burn confirmation without placeholder in {}, dropped",
                transaction.id
            );
            return;
        };
        let Some(mut burn) = self.store.get::<BurnRecord>(&burn_id) else {
            return;
        };

        let pair_id = address_id(&pair_address);
        let Some(mut pair) = self.store.get::<Pair>(&pair_id) else {
            return;
        };
        let Some(mut token0) = self.store.get::<Token>(&pair.token0) else {
            return;
        };
        let Some(mut token1) = self.store.get::<Token>(&pair.token1) else {
            return;
        };
        let factory_id = address_id(&self.config.factory);
        let Some(mut factory) = self.store.get::<Factory>(&factory_id) else {
            return;
        };

        let token0_amount = convert_token_to_decimal(amount0, token0.decimals);
        let token1_amount = convert_token_to_decimal(amount1, token1.decimals);

        token0.tx_count += 1;
        token1.tx_count += 1;

        let bundle = self.refresh_bundle();
        let amount_total_usd = (&token1.derived_ref * &token1_amount
            + &token0.derived_ref * &token0_amount)
            * &bundle.ref_price_usd;

        pair.tx_count += 1;
        factory.tx_count += 1;

        self.store.put(token0);
        self.store.put(token1);
        self.store.put(pair);
        self.store.put(factory);

        burn.sender = Some(address_id(&sender));
        burn.to = Some(address_id(&to));
        burn.amount0 = Some(token0_amount);
        burn.amount1 = Some(token1_amount);
        burn.log_index = Some(meta.log_index);
        burn.amount_usd = Some(amount_total_usd);
        self.store.put(burn);
    }
}

//! Swap handling.
//!
//! Swaps never touch reserves (the paired Sync does); they roll volume
//! into the token, pool, and protocol aggregates under two valuations:
//! an untracked estimate over both sides' derived prices, and the
//! whitelist-filtered tracked figure.

use alloy::primitives::{Address, U256};
use bigdecimal::{BigDecimal, Zero};

use crate::events::EventMeta;
use crate::models::account::Account;
use crate::models::factory::Bundle;
use crate::models::pair::Pair;
use crate::models::token::Token;
use crate::pricing::{self, ReferencePoolReader};
use crate::store::EntityStore;
use crate::utils::ids::{address_id, record_id};
use crate::utils::numeric::{almost_zero, convert_token_to_decimal, zero};

use super::Reconciler;

impl<S: EntityStore, R: ReferencePoolReader> Reconciler<S, R> {
    /// Handle a Swap event.
    #[allow(clippy::too_many_arguments, clippy::too_many_lines)]
    pub(crate) fn handle_swap(
        &mut self,
        pair_address: Address,
        sender: Address,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
        meta: &EventMeta,
    ) {
        let mut transaction = self.get_or_create_transaction(meta);

        let pair_id = address_id(&pair_address);
        let Some(mut pair) = self.store.get::<Pair>(&pair_id) else {
            log::debug!("reconcile::swap: swap from unregistered pool {pair_id}, dropped");
            return;
        };
        let Some(mut token0) = self.store.get::<Token>(&pair.token0) else {
            return;
        };
        let Some(mut token1) = self.store.get::<Token>(&pair.token1) else {
            return;
        };

        let amount0_in = convert_token_to_decimal(amount0_in, token0.decimals);
        let amount1_in = convert_token_to_decimal(amount1_in, token1.decimals);
        let amount0_out = convert_token_to_decimal(amount0_out, token0.decimals);
        let amount1_out = convert_token_to_decimal(amount1_out, token1.decimals);

        // Totals moved per side, whichever direction the trade went.
        let amount0_total = &amount0_out + &amount0_in;
        let amount1_total = &amount1_out + &amount1_in;

        let Some(mut bundle) = self.store.get::<Bundle>(Bundle::ID) else {
            log::debug!("reconcile::swap: no price bundle yet, dropped");
            return;
        };
        bundle.ref_price_usd = pricing::ref_price_in_usd(&self.reference_pool, &self.config);
        self.store.put(bundle.clone());

        // Untracked estimate: average both sides, unless one of them has
        // no derived price yet and would drag the average toward zero.
        let side0 = &token0.derived_ref * &amount0_total;
        let side1 = &token1.derived_ref * &amount1_total;
        let mut derived_amount_ref = &side0 + &side1;
        if side0 > almost_zero() && side1 > almost_zero() {
            derived_amount_ref = derived_amount_ref / BigDecimal::from(2);
        }
        let derived_amount_usd = &derived_amount_ref * &bundle.ref_price_usd;

        let tracked_amount_usd = pricing::tracked_volume_usd(
            &self.store,
            &self.config,
            &amount0_total,
            &token0,
            &amount1_total,
            &token1,
            &pair,
        );
        let tracked_amount_ref = if bundle.ref_price_usd.is_zero() {
            zero()
        } else {
            &tracked_amount_usd / &bundle.ref_price_usd
        };

        token0.trade_volume = &token0.trade_volume + &amount0_total;
        token0.trade_volume_usd = &token0.trade_volume_usd + &tracked_amount_usd;
        token0.untracked_volume_usd = &token0.untracked_volume_usd + &derived_amount_usd;
        token0.tx_count += 1;

        token1.trade_volume = &token1.trade_volume + &amount1_total;
        token1.trade_volume_usd = &token1.trade_volume_usd + &tracked_amount_usd;
        token1.untracked_volume_usd = &token1.untracked_volume_usd + &derived_amount_usd;
        token1.tx_count += 1;

        pair.volume_usd = &pair.volume_usd + &tracked_amount_usd;
        pair.volume_token0 = &pair.volume_token0 + &amount0_total;
        pair.volume_token1 = &pair.volume_token1 + &amount1_total;
        pair.untracked_volume_usd = &pair.untracked_volume_usd + &derived_amount_usd;
        pair.tx_count += 1;
        self.store.put(pair.clone());

        let factory_id = address_id(&self.config.factory);
        let Some(mut factory) = self.store.get::<crate::models::factory::Factory>(&factory_id)
        else {
            log::debug!("reconcile::swap: no factory record, dropped");
            return;
        };
        factory.total_volume_usd = &factory.total_volume_usd + &tracked_amount_usd;
        factory.total_volume_ref = &factory.total_volume_ref + &tracked_amount_ref;
        factory.untracked_volume_usd = &factory.untracked_volume_usd + &derived_amount_usd;
        factory.tx_count += 1;

        self.store.put(token0);
        self.store.put(token1);
        self.store.put(factory);

        // The tracked figure is the better one when we have it.
        let amount_usd = if tracked_amount_usd.is_zero() {
            derived_amount_usd
        } else {
            tracked_amount_usd
        };

        let swap = crate::models::transaction::SwapRecord {
            id: record_id(&transaction.id, transaction.swaps.len()),
            transaction: transaction.id.clone(),
            pair: pair_id,
            sender: address_id(&sender),
            to: address_id(&to),
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
            amount_usd: amount_usd.clone(),
            log_index: meta.log_index,
            timestamp: meta.timestamp,
        };
        self.store.put(swap.clone());
        transaction.swaps.append(swap.id);
        self.store.put(transaction);

        let mut account = self.get_or_create_account(to);
        account.usd_swapped = &account.usd_swapped + &amount_usd;
        self.store.put::<Account>(account);
    }
}

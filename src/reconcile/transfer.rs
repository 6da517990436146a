//! Pool-token transfer handling.
//!
//! Transfers of the pool's own accounting token encode four distinct
//! situations that must be told apart by their endpoints: mints (from
//! the zero address), the two-phase burn (LP to pool, then pool to
//! zero), and ordinary wallet-to-wallet moves. Mint and burn transfers
//! build provisional logical records that the pool's own Mint/Burn
//! confirmation events complete afterwards.

use alloy::primitives::{Address, U256};

use crate::events::EventMeta;
use crate::models::pair::Pair;
use crate::models::transaction::{BurnRecord, MintRecord};
use crate::pricing::ReferencePoolReader;
use crate::store::EntityStore;
use crate::utils::ids::{address_id, record_id};
use crate::utils::numeric::convert_token_to_decimal;

use super::{Reconciler, POOL_TOKEN_DECIMALS};

impl<S: EntityStore, R: ReferencePoolReader> Reconciler<S, R> {
    /// Handle a pool-token Transfer event.
    pub(crate) fn handle_transfer(
        &mut self,
        pair_address: Address,
        from: Address,
        to: Address,
        value: U256,
        meta: &EventMeta,
    ) {
        // The AMM permanently locks the first minimum-liquidity units at
        // pool bootstrap; that mint is not a user action.
        if from == Address::ZERO && value == self.config.minimum_liquidity_lock {
            return;
        }

        let pair_id = address_id(&pair_address);
        let Some(mut pair) = self.store.get::<Pair>(&pair_id) else {
            log::debug!("reconcile::transfer: transfer from unregistered pool {pair_id}, dropped");
            return;
        };

        self.get_or_create_account(from);
        self.get_or_create_account(to);

        let value_dec = convert_token_to_decimal(value, POOL_TOKEN_DECIMALS);
        let from_id = address_id(&from);
        let to_id = address_id(&to);

        let mut transaction = self.get_or_create_transaction(meta);

        // Mint path: the pool token is an ERC20 and minting transfers
        // from the zero address.
        if from == Address::ZERO {
            pair.total_supply = &pair.total_supply + &value_dec;
            self.store.put(pair.clone());

            // Transfers and Mint confirmations come in pairs. Only start
            // a new logical mint when the previous one has been
            // confirmed; an unconfirmed tail entry is still waiting for
            // its Mint event and must not be duplicated.
            let tail_complete = transaction
                .mints
                .last()
                .map_or(true, |id| self.mint_is_complete(id));
            if tail_complete {
                let mint = MintRecord {
                    id: record_id(&transaction.id, transaction.mints.len()),
                    transaction: transaction.id.clone(),
                    pair: pair_id.clone(),
                    to: to_id.clone(),
                    liquidity: value_dec.clone(),
                    timestamp: meta.timestamp,
                    sender: None,
                    amount0: None,
                    amount1: None,
                    amount_usd: None,
                    log_index: None,
                };
                self.store.put(mint.clone());
                transaction.mints.append(mint.id);
                self.store.put(transaction.clone());

                self.adjust_position(&to_id, &pair_id, value_dec.clone(), meta);
            }
        }

        // Burn staging: before every burn the LP sends pool tokens back
        // to the pool itself. Captured eagerly; the finalizing transfer
        // may or may not follow in this transaction.
        if to_id == pair.id {
            let burn = BurnRecord {
                id: record_id(&transaction.id, transaction.burns.len()),
                transaction: transaction.id.clone(),
                pair: pair_id.clone(),
                liquidity: value_dec.clone(),
                timestamp: meta.timestamp,
                needs_complete: true,
                sender: Some(from_id.clone()),
                to: Some(to_id.clone()),
                amount0: None,
                amount1: None,
                amount_usd: None,
                log_index: None,
                fee_to: None,
                fee_liquidity: None,
            };
            self.store.put(burn.clone());
            transaction.burns.append(burn.id);
            self.store.put(transaction.clone());
        }

        // Burn finalize: the pool sends the staged tokens to the zero
        // address.
        if to == Address::ZERO && from_id == pair.id {
            pair.total_supply = &pair.total_supply - &value_dec;
            self.store.put(pair.clone());

            let staged = transaction
                .burns
                .last()
                .and_then(|id| self.store.get::<BurnRecord>(id))
                .filter(|burn| burn.needs_complete);
            let reused = staged.is_some();

            let mut burn = staged.unwrap_or_else(|| BurnRecord {
                id: record_id(&transaction.id, transaction.burns.len()),
                transaction: transaction.id.clone(),
                pair: pair_id.clone(),
                liquidity: value_dec.clone(),
                timestamp: meta.timestamp,
                needs_complete: false,
                sender: None,
                to: None,
                amount0: None,
                amount1: None,
                amount_usd: None,
                log_index: None,
                fee_to: None,
                fee_liquidity: None,
            });

            if reused {
                if let Some(sender) = burn.sender.clone() {
                    self.adjust_position(&sender, &pair_id, -value_dec.clone(), meta);
                }
            }

            // An unconfirmed mint sitting at the tail here is not a
            // liquidity addition: the pool minted collected trading fees
            // to the fee recipient as part of this burn. Reclassify it.
            if let Some(mint_id) = transaction.mints.last().map(str::to_string) {
                if let Some(mint) = self.store.get::<MintRecord>(&mint_id) {
                    if !mint.is_complete() {
                        burn.fee_to = Some(mint.to);
                        burn.fee_liquidity = Some(mint.liquidity);
                        self.store.delete::<MintRecord>(&mint_id);
                        transaction.mints.pop_last();
                    }
                }
            }

            self.store.put(burn.clone());
            if reused {
                transaction.burns.replace_last(burn.id);
            } else {
                transaction.burns.append(burn.id);
            }
            self.store.put(transaction.clone());
        }

        // Ordinary move of pool tokens between wallets.
        if from != Address::ZERO && to != Address::ZERO && from_id != pair.id && to_id != pair.id {
            self.adjust_position(&from_id, &pair_id, -value_dec.clone(), meta);
            self.adjust_position(&to_id, &pair_id, value_dec, meta);
        }
    }

    /// Whether a logical mint has been filled by its Mint confirmation.
    /// A dangling id counts as complete so a fresh record gets created.
    fn mint_is_complete(&self, mint_id: &str) -> bool {
        self.store
            .get::<MintRecord>(mint_id)
            .map_or(true, |mint| mint.is_complete())
    }
}

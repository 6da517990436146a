//! The pricing oracle.
//!
//! Derives a reference-currency value for every token by walking the
//! whitelist graph, and filters USD volume/liquidity figures through
//! liquidity-based trust heuristics. Prices degrade to zero ("unknown")
//! rather than erroring: the stream must keep advancing even while a
//! figure is temporarily unpriceable.

use alloy::primitives::{Address, U256};
use bigdecimal::{BigDecimal, Zero};
use eyre::Result;

use crate::config::ChainConfig;
use crate::models::factory::Bundle;
use crate::models::pair::{Pair, PairLookup};
use crate::models::token::Token;
use crate::store::EntityStore;
use crate::utils::ids::{address_id, pair_lookup_id};
use crate::utils::numeric::{one, u256_to_decimal, zero};

/// Pools with fewer providers than this get the reserve-floor check
/// before their swap volume is tracked.
const THIN_POOL_PROVIDER_COUNT: u64 = 5;

/// Read access to the external reference liquidity pool.
///
/// The pool may not be deployed yet or the call may revert; either is an
/// `Err`, and the oracle maps it to a zero price. Callers must treat a
/// zero reference price as "price unknown", never as "price is zero".
pub trait ReferencePoolReader {
    /// Current reserves `(reserve0, reserve1)` in base units.
    ///
    /// # Errors
    /// * If the pool is not deployed or the call reverts
    fn reserves(&self) -> Result<(U256, U256)>;

    /// Address of the pool's token0.
    ///
    /// # Errors
    /// * If the pool is not deployed or the call reverts
    fn token0(&self) -> Result<Address>;
}

/// Division that yields zero on a zero denominator instead of failing.
///
/// Every ratio in the engine goes through here; callers never special-case
/// zero themselves.
#[must_use]
pub fn safe_div(numerator: &BigDecimal, denominator: &BigDecimal) -> BigDecimal {
    if denominator.is_zero() {
        zero()
    } else {
        numerator / denominator
    }
}

/// Reference-currency price in USD, read from the external reference pool.
///
/// Identifies which side of the pool holds the reference token and returns
/// the raw reserve ratio (stablecoin units per reference-token unit).
/// Returns zero when the pool cannot be read.
pub fn ref_price_in_usd<R: ReferencePoolReader>(reader: &R, config: &ChainConfig) -> BigDecimal {
    let Ok((reserve0, reserve1)) = reader.reserves() else {
        log::debug!("pricing::ref_price_in_usd: reference pool reserves unavailable");
        return zero();
    };
    let Ok(token0) = reader.token0() else {
        log::debug!("pricing::ref_price_in_usd: reference pool token0 unavailable");
        return zero();
    };

    let reserve0 = u256_to_decimal(reserve0);
    let reserve1 = u256_to_decimal(reserve1);

    if token0 == config.reference_token {
        safe_div(&reserve1, &reserve0)
    } else {
        safe_div(&reserve0, &reserve1)
    }
}

/// A token's value denominated in the reference currency.
///
/// The reference token is exactly 1. The stablecoin is the reciprocal of
/// the current reference price. Every other token is priced through the
/// first whitelist pairing whose pool holds enough reference-currency
/// reserve; the first qualifying entry wins, not the deepest one. Returns
/// zero when no whitelist pairing qualifies.
pub fn find_ref_price_per_token<S: EntityStore>(
    store: &S,
    config: &ChainConfig,
    token: &Token,
) -> BigDecimal {
    if token.id == config.reference_token_id() {
        return one();
    }

    if token.id == config.stable_token_id() {
        let ref_price = bundle_ref_price(store);
        return safe_div(&one(), &ref_price);
    }

    for whitelist_token in &config.whitelist {
        let lookup_id = pair_lookup_id(&token.id, &address_id(whitelist_token));
        let Some(lookup) = store.get::<PairLookup>(&lookup_id) else {
            continue;
        };
        let Some(pair) = store.get::<Pair>(&lookup.pair) else {
            continue;
        };
        if pair.reserve_ref <= config.minimum_liquidity_threshold_ref {
            continue;
        }

        if pair.token0 == token.id {
            if let Some(other) = store.get::<Token>(&pair.token1) {
                return pair.token1_price * other.derived_ref;
            }
        }
        if pair.token1 == token.id {
            if let Some(other) = store.get::<Token>(&pair.token0) {
                return pair.token0_price * other.derived_ref;
            }
        }
    }

    zero()
}

/// Trust-filtered USD value of one swap.
///
/// Thin pools (fewer than five providers) must clear a reserve-value
/// floor first. Both sides whitelisted: average of the two sides' USD
/// amounts. One side: that side's amount. Neither: zero.
pub fn tracked_volume_usd<S: EntityStore>(
    store: &S,
    config: &ChainConfig,
    amount0: &BigDecimal,
    token0: &Token,
    amount1: &BigDecimal,
    token1: &Token,
    pair: &Pair,
) -> BigDecimal {
    let ref_price = bundle_ref_price(store);
    let price0 = &token0.derived_ref * &ref_price;
    let price1 = &token1.derived_ref * &ref_price;

    let whitelisted0 = config.is_whitelisted(&token0.id);
    let whitelisted1 = config.is_whitelisted(&token1.id);

    // A freshly created pool can self-report arbitrary reserves; require
    // real whitelist-side reserve value before tracking its swaps.
    if pair.liquidity_provider_count < THIN_POOL_PROVIDER_COUNT {
        let reserve0_usd = &pair.reserve0 * &price0;
        let reserve1_usd = &pair.reserve1 * &price1;
        let floor = &config.minimum_usd_threshold_new_pairs;

        if whitelisted0 && whitelisted1 && &(&reserve0_usd + &reserve1_usd) < floor {
            return zero();
        }
        if whitelisted0 && !whitelisted1 && &(&reserve0_usd * BigDecimal::from(2)) < floor {
            return zero();
        }
        if !whitelisted0 && whitelisted1 && &(&reserve1_usd * BigDecimal::from(2)) < floor {
            return zero();
        }
    }

    if whitelisted0 && whitelisted1 {
        return (amount0 * &price0 + amount1 * &price1) / BigDecimal::from(2);
    }
    if whitelisted0 {
        return amount0 * &price0;
    }
    if whitelisted1 {
        return amount1 * &price1;
    }

    zero()
}

/// Trust-filtered USD value of a pool's liquidity.
///
/// Both sides whitelisted: sum of both sides. One side: double that side,
/// approximating the untracked side as equal value. Neither: zero.
pub fn tracked_liquidity_usd<S: EntityStore>(
    store: &S,
    config: &ChainConfig,
    amount0: &BigDecimal,
    token0: &Token,
    amount1: &BigDecimal,
    token1: &Token,
) -> BigDecimal {
    let ref_price = bundle_ref_price(store);
    let price0 = &token0.derived_ref * &ref_price;
    let price1 = &token1.derived_ref * &ref_price;

    let whitelisted0 = config.is_whitelisted(&token0.id);
    let whitelisted1 = config.is_whitelisted(&token1.id);

    if whitelisted0 && whitelisted1 {
        return amount0 * &price0 + amount1 * &price1;
    }
    if whitelisted0 {
        return amount0 * &price0 * BigDecimal::from(2);
    }
    if whitelisted1 {
        return amount1 * &price1 * BigDecimal::from(2);
    }

    zero()
}

/// Single-token variant of the liquidity trust filter.
///
/// The primary token's own USD value whenever the primary is whitelisted;
/// the companion's value when only the companion is; zero otherwise.
pub fn token_tracked_liquidity_usd<S: EntityStore>(
    store: &S,
    config: &ChainConfig,
    primary: &Token,
    primary_amount: &BigDecimal,
    companion_amount: &BigDecimal,
    companion: &Token,
) -> BigDecimal {
    let ref_price = bundle_ref_price(store);

    if config.is_whitelisted(&primary.id) {
        return primary_amount * &primary.derived_ref * &ref_price;
    }
    if config.is_whitelisted(&companion.id) {
        return companion_amount * &companion.derived_ref * &ref_price;
    }

    zero()
}

/// Current bundle reference price, zero when the bundle does not exist
/// yet.
fn bundle_ref_price<S: EntityStore>(store: &S) -> BigDecimal {
    store
        .get::<Bundle>(Bundle::ID)
        .map_or_else(zero, |bundle| bundle.ref_price_usd)
}

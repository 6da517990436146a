//! Exact numeric conversions between chain-native integers and decimals.
//!
//! All derived figures in the engine use base-10 [`BigDecimal`] arithmetic.
//! Raw event amounts arrive as 256-bit unsigned integers in token base
//! units and are scaled down by the token's decimals exactly, with no
//! intermediate floating point.

use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, One, Zero};

/// Convert a raw `U256` into an unscaled `BigDecimal`.
#[must_use]
pub fn u256_to_decimal(value: U256) -> BigDecimal {
    let bytes: [u8; 32] = value.to_be_bytes();
    BigDecimal::from(BigInt::from_bytes_be(Sign::Plus, &bytes))
}

/// Compute `10^decimals` as an exact decimal.
#[must_use]
pub fn decimal_base(decimals: u32) -> BigDecimal {
    let mut base = BigDecimal::one();
    for _ in 0..decimals {
        base *= BigDecimal::from(10);
    }
    base
}

/// Scale a raw token amount down by the token's decimals.
///
/// Tokens reporting zero decimals are taken at face value.
#[must_use]
pub fn convert_token_to_decimal(value: U256, decimals: u32) -> BigDecimal {
    let raw = u256_to_decimal(value);
    if decimals == 0 {
        return raw;
    }
    raw / decimal_base(decimals)
}

/// The smallest derived amount still treated as a real value.
///
/// Swap valuation skips averaging when one side of the trade values to
/// less than this (a token with no derived price yet).
#[must_use]
pub fn almost_zero() -> BigDecimal {
    BigDecimal::new(BigInt::from(1), 18)
}

/// Exact decimal zero.
#[must_use]
pub fn zero() -> BigDecimal {
    BigDecimal::zero()
}

/// Exact decimal one.
#[must_use]
pub fn one() -> BigDecimal {
    BigDecimal::one()
}

//! Price conversion utilities for Uniswap V3.
//!
//! Functions for converting a pool's sqrtPriceX96 into human-unit prices.
//! All intermediate values are kept in arbitrary precision: the square of a
//! 160-bit sqrtPriceX96 does not fit in 256 bits.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use once_cell::sync::Lazy;

use super::conversion::{big_pow10, big_pow2, to_finite_f64, u256_to_bigint};

// ============================================
// Constants
// ============================================

/// 2^192 as an integer, the scale of a squared sqrtPriceX96.
static Q192: Lazy<BigInt> = Lazy::new(|| BigInt::from(1u8) << 192);

// ============================================
// sqrtPriceX96 to Price Conversion
// ============================================

/// Decimal factor 10^decimals0 / 10^decimals1.
fn decimal_adjustment(decimals0: u8, decimals1: u8) -> BigDecimal {
    big_pow10(decimals0) / big_pow10(decimals1)
}

/// Price of token0 in units of token1, adjusted for decimals.
///
/// `sqrtPriceX96^2 * (10^decimals0 / 10^decimals1) / 2^192`
///
/// Returns `None` for an uninitialised pool (zero sqrt price).
pub fn pair_price_from_sqrt_x96(
    sqrt_price_x96: U256,
    token0_decimals: u8,
    token1_decimals: u8,
) -> Option<f64> {
    if sqrt_price_x96.is_zero() {
        return None;
    }

    let sqrt_price = u256_to_bigint(sqrt_price_x96);
    let price_x192 = BigDecimal::from(&sqrt_price * &sqrt_price);

    let adjusted = price_x192 * decimal_adjustment(token0_decimals, token1_decimals) / big_pow2(192);
    to_finite_f64(&adjusted)
}

/// USD price of a token read from its pool against the reference stablecoin.
///
/// The pool price is token1 per token0. When the token is token0 it is used
/// as is; when the token is token1 it is inverted to `2^192 / (price_x96 / 2^192)`.
/// Either way the result is quote units per token unit, rescaled by
/// `10^token_decimals / 10^quote_decimals`.
pub fn usd_price_from_sqrt_x96(
    sqrt_price_x96: U256,
    token_is_token0: bool,
    token_decimals: u8,
    quote_decimals: u8,
) -> Option<f64> {
    if sqrt_price_x96.is_zero() {
        return None;
    }

    let sqrt_price = u256_to_bigint(sqrt_price_x96);
    let price_x96 = &sqrt_price * &sqrt_price;

    let price_x96 = if token_is_token0 {
        BigDecimal::from(price_x96)
    } else {
        // 2^192 / (price_x96 / 2^192) == 2^384 / price_x96
        BigDecimal::from(&*Q192 * &*Q192) / BigDecimal::from(price_x96)
    };

    let adjusted = price_x96 * decimal_adjustment(token_decimals, quote_decimals) / big_pow2(192);
    to_finite_f64(&adjusted)
}

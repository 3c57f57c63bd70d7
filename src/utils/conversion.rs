//! Type conversion utilities.
//!
//! Functions for converting on-chain integers (U256, u128) into `BigInt`,
//! `BigDecimal` and decimal-adjusted `f64` values without losing precision
//! before the final conversion.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use once_cell::sync::Lazy;

// ============================================
// U256 Conversions
// ============================================

/// Convert alloy U256 to an unsigned `BigInt` via its little-endian bytes.
pub fn u256_to_bigint(value: U256) -> BigInt {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigInt::from_bytes_le(Sign::Plus, &bytes)
}

/// Convert U256 to f64 with decimal adjustment using BigDecimal for precision.
///
/// # Returns
/// * The adjusted f64 value, or 0.0 if conversion fails
///
/// # Example
/// ```ignore
/// let value = U256::from(1_000_000_000_000_000_000u128); // 1e18
/// let adjusted = u256_to_f64(value, 18); // Returns 1.0
/// ```
pub fn u256_to_f64(value: U256, decimals: u8) -> f64 {
    u256_to_f64_safe(value, decimals).unwrap_or(0.0)
}

/// Convert U256 to f64 with decimal adjustment, returning Option for error handling.
///
/// Returns None if the value cannot be converted to a finite f64.
pub fn u256_to_f64_safe(value: U256, decimals: u8) -> Option<f64> {
    let big_value = BigDecimal::from(u256_to_bigint(value));

    let adjusted = big_value / big_pow10(decimals);

    to_finite_f64(&adjusted)
}

/// Convert a BigDecimal to f64, rejecting NaN and infinities.
pub(crate) fn to_finite_f64(value: &BigDecimal) -> Option<f64> {
    let result = value.to_f64()?;

    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}

/// Compute 2^exp as BigDecimal.
pub(crate) fn big_pow2(exp: u32) -> BigDecimal {
    BigDecimal::from(BigInt::from(1u8) << exp)
}

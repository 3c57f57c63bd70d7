//! Fee growth accounting for Uniswap V3 positions.
//!
//! Fee growth accumulators are Q128.128 values that only ever increase modulo
//! 2^256. Differences between them are therefore taken with wrapping
//! subtraction; an underflow is expected and is not an error.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;

use super::conversion::{big_pow10, big_pow2, to_finite_f64, u256_to_bigint};

/// Fee growth per unit of liquidity accrued since the position's last snapshot:
///
/// `global - outside_lower - outside_upper - inside_last  (mod 2^256)`
pub fn fee_growth_delta(
    fee_growth_global_x128: U256,
    fee_growth_outside_lower_x128: U256,
    fee_growth_outside_upper_x128: U256,
    fee_growth_inside_last_x128: U256,
) -> U256 {
    fee_growth_global_x128
        .wrapping_sub(fee_growth_outside_lower_x128)
        .wrapping_sub(fee_growth_outside_upper_x128)
        .wrapping_sub(fee_growth_inside_last_x128)
}

/// Uncollected fee amount in human units: `(delta / 2^128) * liquidity / 10^decimals`.
pub fn fee_amount(fee_growth_delta_x128: U256, liquidity: u128, decimals: u8) -> f64 {
    if fee_growth_delta_x128.is_zero() || liquidity == 0 {
        return 0.0;
    }

    let delta = BigDecimal::from(u256_to_bigint(fee_growth_delta_x128));
    let amount = delta * BigDecimal::from(liquidity) / big_pow2(128) / big_pow10(decimals);

    to_finite_f64(&amount).unwrap_or(0.0)
}

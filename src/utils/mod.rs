//! Utility functions for position valuation.
//!
//! - [`conversion`] - Type conversions (U256, BigInt, BigDecimal, f64)
//! - [`price`] - sqrtPriceX96 to pair and USD prices
//! - [`tick_math`] - Tick to sqrt price and owned token amounts
//! - [`fee_math`] - Fee growth differencing and fee amounts

mod conversion;
mod fee_math;
mod price;
mod tick_math;

// ============================================
// Re-exports
// ============================================

pub use conversion::{u256_to_bigint, u256_to_f64, u256_to_f64_safe};

pub use fee_math::{fee_amount, fee_growth_delta};

pub use price::{pair_price_from_sqrt_x96, usd_price_from_sqrt_x96};

pub use tick_math::{amounts_for_liquidity, tick_to_sqrt_price, MAX_TICK, MIN_TICK};

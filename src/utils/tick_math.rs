//! Tick math for Uniswap V3 position valuation.
//!
//! Implements tick-to-price conversion following Uniswap V3's TickMath.sol
//! bit decomposition, and the concentrated-liquidity token amount formulas.

// ============================================
// Precomputed Constants
// ============================================

/// Valid tick range is -887272 to 887272 (Uniswap V3 limits)
pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

// 1/sqrt(1.0001)^(2^i) = 1.0001^(-0.5 * 2^i) for i = 0..19
const TICK_MULTIPLIERS: [f64; 20] = [
    0.9999500037496876,    // 1.0001^(-0.5)
    0.9999000099990001,    // 1.0001^(-1)
    0.9998000299960005,    // 1.0001^(-2)
    0.9996000999800035,    // 1.0001^(-4)
    0.999200359880033,     // 1.0001^(-8)
    0.9984013591843874,    // 1.0001^(-16)
    0.9968052740212322,    // 1.0001^(-32)
    0.9936207543165438,    // 1.0001^(-64)
    0.9872822034085776,    // 1.0001^(-128)
    0.974726149167296,     // 1.0001^(-256)
    0.950091065870506,     // 1.0001^(-512)
    0.902673033446954,     // 1.0001^(-1024)
    0.8148186053123259,    // 1.0001^(-2048)
    0.6639293595631239,    // 1.0001^(-4096)
    0.4408021944898999,    // 1.0001^(-8192)
    0.19430657466711154,   // 1.0001^(-16384)
    0.037755044958865794,  // 1.0001^(-32768)
    0.0014254434198459772, // 1.0001^(-65536)
    2.031888943182195e-6,  // 1.0001^(-131072)
    4.128572677426057e-12, // 1.0001^(-262144)
];

// ============================================
// Tick to Price Conversion
// ============================================

/// `sqrt(1.0001^tick)`, the square root of the price at `tick`.
///
/// Ticks outside [MIN_TICK, MAX_TICK] are clamped.
pub fn tick_to_sqrt_price(tick: i32) -> f64 {
    let clamped_tick = tick.clamp(MIN_TICK, MAX_TICK);
    let abs_tick = clamped_tick.unsigned_abs();

    let ratio = TICK_MULTIPLIERS
        .iter()
        .enumerate()
        .filter(|(bit, _)| abs_tick & (1 << bit) != 0)
        .fold(1.0_f64, |ratio, (_, multiplier)| ratio * multiplier);

    // For positive ticks, take reciprocal
    if clamped_tick > 0 {
        1.0 / ratio
    } else {
        ratio
    }
}

// ============================================
// Liquidity Amount Calculations
// ============================================

/// Raw (not decimal-adjusted) token amounts held by `liquidity` over
/// `[tick_lower, tick_upper]` at `current_tick`.
///
/// With `pa`, `pb`, `p` the square-root prices of the bounds and current tick:
/// - amount0 = L * (pb - p) / (p * pb)
/// - amount1 = L * (p - pa)
///
/// `p` is clamped into `[pa, pb]`, so a position below its range holds only
/// token0 and a position above its range holds only token1.
pub fn amounts_for_liquidity(
    liquidity: u128,
    tick_lower: i32,
    tick_upper: i32,
    current_tick: i32,
) -> (f64, f64) {
    if liquidity == 0 || tick_lower >= tick_upper {
        return (0.0, 0.0);
    }

    let liquidity = liquidity as f64;
    let pa = tick_to_sqrt_price(tick_lower);
    let pb = tick_to_sqrt_price(tick_upper);
    let p = tick_to_sqrt_price(current_tick).clamp(pa, pb);

    let amount0 = liquidity * (pb - p) / (p * pb);
    let amount1 = liquidity * (p - pa);

    (amount0, amount1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_sqrt_price(tick: i32) -> f64 {
        1.0001_f64.powi(tick).sqrt()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let rel = if expected == 0.0 {
            actual.abs()
        } else {
            ((actual - expected) / expected).abs()
        };
        assert!(rel < tolerance, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_tick_zero_is_unit_price() {
        assert_eq!(tick_to_sqrt_price(0), 1.0);
    }

    #[test]
    fn test_tick_to_sqrt_price_matches_power_formula() {
        for tick in [-887272, -200311, -60, -1, 1, 60, 12345, 200311, 500000, 887272] {
            assert_close(tick_to_sqrt_price(tick), reference_sqrt_price(tick), 1e-10);
        }
    }

    #[test]
    fn test_tick_is_clamped() {
        assert_eq!(tick_to_sqrt_price(MAX_TICK + 10), tick_to_sqrt_price(MAX_TICK));
        assert_eq!(tick_to_sqrt_price(MIN_TICK - 10), tick_to_sqrt_price(MIN_TICK));
    }

    #[test]
    fn test_zero_liquidity_yields_zero_amounts() {
        assert_eq!(amounts_for_liquidity(0, -600, 600, 0), (0.0, 0.0));
        assert_eq!(amounts_for_liquidity(0, -600, 600, 10_000), (0.0, 0.0));
    }

    #[test]
    fn test_inverted_range_yields_zero_amounts() {
        assert_eq!(amounts_for_liquidity(1_000, 600, -600, 0), (0.0, 0.0));
    }

    #[test]
    fn test_in_range_amounts() {
        let liquidity = 1_000_000_000_000u128;
        let (amount0, amount1) = amounts_for_liquidity(liquidity, -600, 600, 0);

        let pa = reference_sqrt_price(-600);
        let pb = reference_sqrt_price(600);
        let l = liquidity as f64;
        assert_close(amount0, l * (pb - 1.0) / pb, 1e-9);
        assert_close(amount1, l * (1.0 - pa), 1e-9);
        // Symmetric range around tick 0 holds (almost) equal raw amounts
        assert_close(amount0, amount1, 1e-3);
    }

    #[test]
    fn test_below_range_holds_only_token0() {
        let liquidity = 5_000_000_000u128;
        let (amount0, amount1) = amounts_for_liquidity(liquidity, 1000, 2000, -5000);

        let pa = reference_sqrt_price(1000);
        let pb = reference_sqrt_price(2000);
        assert_eq!(amount1, 0.0);
        assert!(amount0 > 0.0);
        assert_close(amount0, liquidity as f64 * (pb - pa) / (pa * pb), 1e-9);
    }

    #[test]
    fn test_above_range_holds_only_token1() {
        let liquidity = 5_000_000_000u128;
        let (amount0, amount1) = amounts_for_liquidity(liquidity, 1000, 2000, 9000);

        let pa = reference_sqrt_price(1000);
        let pb = reference_sqrt_price(2000);
        assert_eq!(amount0, 0.0);
        assert_close(amount1, liquidity as f64 * (pb - pa), 1e-9);
    }

    #[test]
    fn test_amounts_at_range_edges() {
        let (amount0, amount1) = amounts_for_liquidity(1_000_000, -100, 100, -100);
        assert_eq!(amount1, 0.0);
        assert!(amount0 > 0.0);

        let (amount0, amount1) = amounts_for_liquidity(1_000_000, -100, 100, 100);
        assert_eq!(amount0, 0.0);
        assert!(amount1 > 0.0);
    }
}

use alloy::primitives::{Address, U256};
use serde::Serialize;

use super::TokenInfo;

/// One liquidity position as recorded by the NonfungiblePositionManager.
///
/// Snapshot of `positions(tokenId)` taken once per tracking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawPosition {
    /// NFT id of the position
    pub token_id: U256,
    pub nonce: U256,
    pub operator: Address,
    pub token0: Address,
    pub token1: Address,
    /// Fee tier in hundredths of a bip (3000 = 0.30%)
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    // Already credited to the position but not withdrawn. Not part of the
    // uncollected fee computation.
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

/// Pair-relative prices. `token1 == 1 / token0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionPrices {
    /// Price of one token0 expressed in token1
    pub token0: f64,
    /// Price of one token1 expressed in token0
    pub token1: f64,
}

impl PositionPrices {
    pub fn from_price0(price0: f64) -> Self {
        Self {
            token0: price0,
            token1: 1.0 / price0,
        }
    }
}

/// Token amounts owned through the position's liquidity, with USD values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionLiquidity {
    pub token0: f64,
    pub token1: f64,
    pub token0_usd: f64,
    pub token1_usd: f64,
}

impl PositionLiquidity {
    pub fn usd(&self) -> f64 {
        self.token0_usd + self.token1_usd
    }
}

/// Uncollected fees, with USD values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionFees {
    pub token0: f64,
    pub token1: f64,
    pub token0_usd: f64,
    pub token1_usd: f64,
}

impl PositionFees {
    pub fn usd(&self) -> f64 {
        self.token0_usd + self.token1_usd
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionTokens {
    pub token0: TokenInfo,
    pub token1: TokenInfo,
}

/// All facets of one position, computed from the same request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionValuation {
    pub position: RawPosition,
    pub tokens: PositionTokens,
    pub prices: PositionPrices,
    pub liquidity: PositionLiquidity,
    pub fees: PositionFees,
}

impl PositionValuation {
    pub fn total_usd(&self) -> f64 {
        self.liquidity.usd() + self.fees.usd()
    }
}

//! Position valuation.
//!
//! A position has three facets computed from pool state (pair prices, owned
//! liquidity, uncollected fees) plus its token metadata. The facets share no
//! state and [`PositionValuator::value`] runs all four concurrently.

use alloy::primitives::Address;
use log::debug;

use crate::{
    chain::{bind, ContractHandle, ContractKind, NetworkConnection, Target},
    error::{Error, Result},
    models::{PositionFees, PositionLiquidity, PositionPrices, PositionTokens, PositionValuation, RawPosition},
    tracker::{MetadataCache, UsdQuoter},
    utils::{amounts_for_liquidity, fee_amount, fee_growth_delta, pair_price_from_sqrt_x96},
};

/// Raw token amount to human units.
fn scale(raw: f64, decimals: u8) -> f64 {
    raw / 10f64.powi(decimals as i32)
}

#[derive(Clone)]
pub struct PositionValuator {
    cache: MetadataCache,
    quoter: UsdQuoter,
}

impl PositionValuator {
    pub fn new(quoter: UsdQuoter) -> Self {
        Self {
            cache: quoter.cache().clone(),
            quoter,
        }
    }

    async fn pool(&self, network: &NetworkConnection, position: &RawPosition) -> Result<ContractHandle> {
        let pool = self
            .cache
            .get_pool_address(network, position.token0, position.token1, position.fee)
            .await?;
        bind(network, ContractKind::Pool, Target::Address(pool))
    }

    /// Zero amounts are worth nothing whether or not a USD pool exists.
    async fn quote(&self, network: &NetworkConnection, token: Address, amount: f64, fee: u32) -> Result<f64> {
        if amount == 0.0 {
            return Ok(0.0);
        }
        self.quoter.quote_usd(network, token, amount, fee).await
    }

    pub async fn fetch_tokens(&self, network: &NetworkConnection, position: &RawPosition) -> Result<PositionTokens> {
        let (token0, token1) = tokio::try_join!(
            self.cache.get_token_info(network, position.token0),
            self.cache.get_token_info(network, position.token1)
        )?;

        Ok(PositionTokens { token0, token1 })
    }

    /// Pair prices at the pool's current sqrt price.
    pub async fn calc_prices(&self, network: &NetworkConnection, position: &RawPosition) -> Result<PositionPrices> {
        let (tokens, pool) = tokio::try_join!(self.fetch_tokens(network, position), self.pool(network, position))?;
        let slot0 = network.reader.slot0(&pool).await?;

        let price0 = pair_price_from_sqrt_x96(
            slot0.sqrt_price_x96,
            tokens.token0.decimals,
            tokens.token1.decimals,
        )
        .ok_or(Error::NoLiquidityPool {
            token: position.token0,
            quote: position.token1,
            fee: position.fee,
        })?;

        Ok(PositionPrices::from_price0(price0))
    }

    /// Token amounts the position's liquidity currently represents, valued in
    /// USD at the position's fee tier.
    pub async fn calc_own_liquidity(
        &self,
        network: &NetworkConnection,
        position: &RawPosition,
    ) -> Result<PositionLiquidity> {
        if position.liquidity == 0 {
            return Ok(PositionLiquidity {
                token0: 0.0,
                token1: 0.0,
                token0_usd: 0.0,
                token1_usd: 0.0,
            });
        }

        let (tokens, pool) = tokio::try_join!(self.fetch_tokens(network, position), self.pool(network, position))?;
        let slot0 = network.reader.slot0(&pool).await?;

        let (raw0, raw1) =
            amounts_for_liquidity(position.liquidity, position.tick_lower, position.tick_upper, slot0.tick);
        let token0 = scale(raw0, tokens.token0.decimals);
        let token1 = scale(raw1, tokens.token1.decimals);

        let (token0_usd, token1_usd) = tokio::try_join!(
            self.quote(network, position.token0, token0, position.fee),
            self.quote(network, position.token1, token1, position.fee)
        )?;

        Ok(PositionLiquidity {
            token0,
            token1,
            token0_usd,
            token1_usd,
        })
    }

    /// Fees earned since the position's last snapshot and not yet credited to
    /// `tokens_owed`.
    pub async fn calc_fees(&self, network: &NetworkConnection, position: &RawPosition) -> Result<PositionFees> {
        let (tokens, pool) = tokio::try_join!(self.fetch_tokens(network, position), self.pool(network, position))?;

        let reader = &network.reader;
        let (global0, global1, lower, upper) = tokio::try_join!(
            reader.fee_growth_global0(&pool),
            reader.fee_growth_global1(&pool),
            reader.tick_fee_growth(&pool, position.tick_lower),
            reader.tick_fee_growth(&pool, position.tick_upper)
        )?;

        let delta0 = fee_growth_delta(
            global0,
            lower.fee_growth_outside0_x128,
            upper.fee_growth_outside0_x128,
            position.fee_growth_inside0_last_x128,
        );
        let delta1 = fee_growth_delta(
            global1,
            lower.fee_growth_outside1_x128,
            upper.fee_growth_outside1_x128,
            position.fee_growth_inside1_last_x128,
        );

        let token0 = fee_amount(delta0, position.liquidity, tokens.token0.decimals);
        let token1 = fee_amount(delta1, position.liquidity, tokens.token1.decimals);

        let (token0_usd, token1_usd) = tokio::try_join!(
            self.quote(network, position.token0, token0, position.fee),
            self.quote(network, position.token1, token1, position.fee)
        )?;

        Ok(PositionFees {
            token0,
            token1,
            token0_usd,
            token1_usd,
        })
    }

    /// Every facet of `position`, read concurrently.
    pub async fn value(&self, network: &NetworkConnection, position: &RawPosition) -> Result<PositionValuation> {
        let (tokens, prices, liquidity, fees) = tokio::try_join!(
            self.fetch_tokens(network, position),
            self.calc_prices(network, position),
            self.calc_own_liquidity(network, position),
            self.calc_fees(network, position)
        )?;

        debug!(
            "{}: position {} {}/{} liquidity=${:.2} fees=${:.2}",
            network.name,
            position.token_id,
            tokens.token0.symbol,
            tokens.token1.symbol,
            liquidity.usd(),
            fees.usd()
        );

        Ok(PositionValuation {
            position: position.clone(),
            tokens,
            prices,
            liquidity,
            fees,
        })
    }
}

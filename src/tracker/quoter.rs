//! USD valuation of token amounts.

use alloy::primitives::Address;
use log::debug;

use crate::{
    chain::{bind, ContractKind, NetworkConnection, Target},
    error::{Error, Result},
    tracker::MetadataCache,
    utils::usd_price_from_sqrt_x96,
};

/// Symbols valued 1:1 in USD without touching a pool. This is a peg
/// assumption, not a price: a depegged stablecoin is still reported at par.
pub const STABLECOIN_SYMBOLS: [&str; 3] = ["USDC", "DAI", "USDT"];

pub fn is_stablecoin(symbol: &str) -> bool {
    STABLECOIN_SYMBOLS.contains(&symbol)
}

/// Prices tokens against the network's reference stablecoin through a single
/// Uniswap V3 pool. No multi-hop routing.
#[derive(Clone)]
pub struct UsdQuoter {
    cache: MetadataCache,
}

impl UsdQuoter {
    pub fn new(cache: MetadataCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// USD value of `amount` (human units) of `token`, read from the
    /// token/stablecoin pool at `fee` tier.
    pub async fn quote_usd(
        &self,
        network: &NetworkConnection,
        token: Address,
        amount: f64,
        fee: u32,
    ) -> Result<f64> {
        let info = self.cache.get_token_info(network, token).await?;
        if is_stablecoin(&info.symbol) {
            return Ok(amount);
        }

        let quote_token = network.usd_stablecoin;
        let (quote, pool) = tokio::try_join!(
            self.cache.get_token_info(network, quote_token),
            self.cache.get_pool_address(network, token, quote_token, fee)
        )?;

        let pool = bind(network, ContractKind::Pool, Target::Address(pool))?;
        let slot0 = network.reader.slot0(&pool).await?;

        let token_is_token0 = token < quote_token;
        let price = usd_price_from_sqrt_x96(
            slot0.sqrt_price_x96,
            token_is_token0,
            info.decimals,
            quote.decimals,
        )
        .ok_or(Error::NoLiquidityPool {
            token,
            quote: quote_token,
            fee,
        })?;

        debug!(
            "{}: {}/{} sqrtPriceX96={} token0={} decimals={}/{} fee={} -> ${}",
            network.name,
            info.symbol,
            quote.symbol,
            slot0.sqrt_price_x96,
            token_is_token0,
            info.decimals,
            quote.decimals,
            fee,
            price
        );

        Ok(price * amount)
    }
}

//! Token metadata and pool address cache.
//!
//! Both values are immutable on-chain once they exist, so entries never
//! expire and are never evicted. Lookups are single-flight per key and
//! failures are never cached.

use std::sync::Arc;

use alloy::primitives::Address;
use log::debug;
use moka::future::Cache;

use crate::{
    chain::{bind, ContractKind, NetworkConnection, NetworkLabel, Target},
    error::{Error, Result},
    models::TokenInfo,
};

type PoolKey = (NetworkLabel, Address, Address, u32);

/// Process-wide metadata cache, shared by handle. Cloning is cheap and every
/// clone sees the same entries.
#[derive(Clone)]
pub struct MetadataCache {
    tokens: Cache<(NetworkLabel, Address), TokenInfo>,
    pools: Cache<PoolKey, Address>,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataCache {
    pub fn new() -> Self {
        Self {
            tokens: Cache::builder().build(),
            pools: Cache::builder().build(),
        }
    }

    /// Symbol and decimals of an ERC-20 token.
    ///
    /// A miss issues `symbol()` and `decimals()` concurrently. Concurrent
    /// misses for the same key wait on the first one instead of issuing their
    /// own calls.
    pub async fn get_token_info(&self, network: &NetworkConnection, address: Address) -> Result<TokenInfo> {
        self.tokens
            .try_get_with((network.label, address), async {
                let token = bind(network, ContractKind::Erc20, Target::Address(address))?;
                let (symbol, decimals) = tokio::try_join!(
                    network.reader.symbol(&token),
                    network.reader.decimals(&token)
                )?;

                debug!("{}: token {address} is {symbol} ({decimals} decimals)", network.name);
                Ok::<_, Error>(TokenInfo::new(symbol, decimals))
            })
            .await
            .map_err(|e: Arc<Error>| (*e).clone())
    }

    /// Pool for the pair and fee tier, looked up through the network's
    /// factory. Token order does not matter.
    ///
    /// Fails with [`Error::NoLiquidityPool`] when the factory returns the
    /// zero address; that answer is not cached since the pool may be created
    /// later.
    pub async fn get_pool_address(
        &self,
        network: &NetworkConnection,
        token: Address,
        quote: Address,
        fee: u32,
    ) -> Result<Address> {
        let (a, b) = if token < quote { (token, quote) } else { (quote, token) };

        self.pools
            .try_get_with((network.label, a, b, fee), async {
                let factory = bind(network, ContractKind::Factory, Target::WellKnown)?;
                let pool = network.reader.get_pool(&factory, token, quote, fee).await?;
                if pool.is_zero() {
                    return Err(Error::NoLiquidityPool { token, quote, fee });
                }

                debug!("{}: pool {pool} for {token}/{quote} at fee tier {fee}", network.name);
                Ok::<_, Error>(pool)
            })
            .await
            .map_err(|e: Arc<Error>| (*e).clone())
    }

    /// Number of cached token entries.
    pub async fn token_count(&self) -> u64 {
        self.tokens.run_pending_tasks().await;
        self.tokens.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::address;
    use futures::future::join_all;

    use super::*;
    use crate::chain::mock::{MockReader, USDC_WETH_POOL};

    const UNKNOWN: Address = address!("00000000000000000000000000000000deadbeef");

    fn usdc() -> Address {
        NetworkLabel::L1.metadata().usd_stablecoin
    }

    fn weth() -> Address {
        NetworkLabel::L1.metadata().wrapped_native
    }

    #[test]
    fn test_entries_are_never_evicted() {
        let cache = MetadataCache::new();
        assert_eq!(cache.tokens.policy().max_capacity(), None);
        assert_eq!(cache.tokens.policy().time_to_live(), None);
        assert_eq!(cache.pools.policy().max_capacity(), None);
        assert_eq!(cache.pools.policy().time_to_live(), None);
    }

    #[tokio::test]
    async fn test_token_info_is_memoized() {
        let mock = Arc::new(MockReader::l1_market());
        let network = NetworkConnection::new(NetworkLabel::L1, mock.clone());
        let cache = MetadataCache::new();

        for _ in 0..3 {
            let info = cache.get_token_info(&network, usdc()).await.unwrap();
            assert_eq!(info, TokenInfo::new("USDC", 6));
        }

        assert_eq!(mock.count("symbol"), 1);
        assert_eq!(mock.count("decimals"), 1);
        assert_eq!(cache.token_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_single_flight() {
        let mut reader = MockReader::l1_market();
        reader.token_delay = Some(Duration::from_millis(20));
        let mock = Arc::new(reader);
        let network = NetworkConnection::new(NetworkLabel::L1, mock.clone());
        let cache = MetadataCache::new();

        let results = join_all((0..8).map(|_| cache.get_token_info(&network, weth()))).await;

        for info in results {
            assert_eq!(info.unwrap(), TokenInfo::new("WETH", 18));
        }
        assert_eq!(mock.count("symbol"), 1);
        assert_eq!(mock.count("decimals"), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mock = Arc::new(MockReader::l1_market());
        let network = NetworkConnection::new(NetworkLabel::L1, mock.clone());
        let cache = MetadataCache::new();

        for _ in 0..2 {
            let err = cache.get_token_info(&network, UNKNOWN).await.unwrap_err();
            assert!(matches!(err, Error::RemoteCall { .. }));
        }

        assert_eq!(mock.count("symbol"), 2);
        assert_eq!(cache.token_count().await, 0);
    }

    #[tokio::test]
    async fn test_entries_are_per_network() {
        let mock = Arc::new(MockReader::l1_market());
        let l1 = NetworkConnection::new(NetworkLabel::L1, mock.clone());
        let arbitrum = NetworkConnection::new(NetworkLabel::Arbitrum, mock.clone());
        let cache = MetadataCache::new();

        cache.get_token_info(&l1, usdc()).await.unwrap();
        cache.get_token_info(&arbitrum, usdc()).await.unwrap();
        cache.get_token_info(&l1, usdc()).await.unwrap();

        assert_eq!(mock.count("symbol"), 2);
    }

    #[tokio::test]
    async fn test_pool_address_is_memoized_in_either_order() {
        let mock = Arc::new(MockReader::l1_market());
        let network = NetworkConnection::new(NetworkLabel::L1, mock.clone());
        let cache = MetadataCache::new();

        let pool = cache.get_pool_address(&network, weth(), usdc(), 3000).await.unwrap();
        assert_eq!(pool, USDC_WETH_POOL);
        let pool = cache.get_pool_address(&network, usdc(), weth(), 3000).await.unwrap();
        assert_eq!(pool, USDC_WETH_POOL);

        assert_eq!(mock.count("getPool"), 1);
    }

    #[tokio::test]
    async fn test_missing_pool_is_not_cached() {
        let mock = Arc::new(MockReader::l1_market());
        let network = NetworkConnection::new(NetworkLabel::L1, mock.clone());
        let cache = MetadataCache::new();

        for _ in 0..2 {
            let err = cache.get_pool_address(&network, weth(), usdc(), 500).await.unwrap_err();
            assert!(matches!(err, Error::NoLiquidityPool { fee: 500, .. }));
        }

        assert_eq!(mock.count("getPool"), 2);
    }
}

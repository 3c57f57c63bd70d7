//! In-memory [`ChainReader`] for tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;

use crate::{
    chain::{ChainReader, ContractHandle, NetworkLabel, Slot0, TickFeeGrowth},
    error::{CallFailure, Error, Result},
    models::RawPosition,
};

pub(crate) const USDC_WETH_POOL: Address = address!("8ad599c3a0ff1de082011efddc58f1908eb6e6d8");

/// Tick of a USDC/WETH pool with ETH at $2000.
pub(crate) const USDC_WETH_TICK: i32 = 200311;

/// sqrtPriceX96 of a USDC(6)/WETH(18) pool with ETH at $2000 (raw price 5e8).
pub(crate) fn usdc_weth_sqrt_price() -> U256 {
    U256::from((5e8f64.sqrt() * 79228162514264337593543950336.0) as u128)
}

/// A USDC/WETH 0.3% position on L1 with no fee history.
pub(crate) fn usdc_weth_position(token_id: u64, tick_lower: i32, tick_upper: i32, liquidity: u128) -> RawPosition {
    let metadata = NetworkLabel::L1.metadata();
    RawPosition {
        token_id: U256::from(token_id),
        nonce: U256::ZERO,
        operator: Address::ZERO,
        token0: metadata.usd_stablecoin,
        token1: metadata.wrapped_native,
        fee: 3000,
        tick_lower,
        tick_upper,
        liquidity,
        fee_growth_inside0_last_x128: U256::ZERO,
        fee_growth_inside1_last_x128: U256::ZERO,
        tokens_owed0: 0,
        tokens_owed1: 0,
    }
}

#[derive(Default)]
pub(crate) struct MockReader {
    pub tokens: HashMap<Address, (String, u8)>,
    pub pools: HashMap<(Address, Address, u32), Address>,
    pub slot0: HashMap<Address, Slot0>,
    pub fee_growth_global: HashMap<Address, (U256, U256)>,
    pub ticks: HashMap<(Address, i32), TickFeeGrowth>,
    pub owned: HashMap<Address, Vec<U256>>,
    pub positions: HashMap<U256, RawPosition>,
    pub balances: HashMap<(Address, Address), U256>,
    pub native_balances: HashMap<Address, U256>,
    /// Owners whose enumeration fails with the given failure at an index
    pub enumeration_failures: HashMap<Address, (u64, CallFailure)>,
    /// Artificial latency of token metadata reads
    pub token_delay: Option<Duration>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockReader {
    /// L1 USDC and WETH with a 0.3% USDC/WETH pool at $2000.
    pub fn l1_market() -> Self {
        let metadata = NetworkLabel::L1.metadata();
        Self::default()
            .with_token(metadata.usd_stablecoin, "USDC", 6)
            .with_token(metadata.wrapped_native, "WETH", 18)
            .with_pool(
                metadata.usd_stablecoin,
                metadata.wrapped_native,
                3000,
                USDC_WETH_POOL,
                Slot0 {
                    sqrt_price_x96: usdc_weth_sqrt_price(),
                    tick: USDC_WETH_TICK,
                },
            )
    }

    pub fn into_shared(self) -> Arc<dyn ChainReader> {
        Arc::new(self)
    }

    pub fn with_token(mut self, address: Address, symbol: &str, decimals: u8) -> Self {
        self.tokens.insert(address, (symbol.to_string(), decimals));
        self
    }

    pub fn with_pool(mut self, token_a: Address, token_b: Address, fee: u32, pool: Address, slot0: Slot0) -> Self {
        self.pools.insert((token_a, token_b, fee), pool);
        self.slot0.insert(pool, slot0);
        self
    }

    pub fn with_position(mut self, owner: Address, position: RawPosition) -> Self {
        self.owned.entry(owner).or_default().push(position.token_id);
        self.positions.insert(position.token_id, position);
        self
    }

    /// Number of times `call` was issued.
    pub fn count(&self, call: &'static str) -> usize {
        self.calls.lock().unwrap().get(call).copied().unwrap_or(0)
    }

    fn record(&self, call: &'static str) {
        *self.calls.lock().unwrap().entry(call).or_default() += 1;
    }

    fn revert(call: &'static str, reason: &str) -> Error {
        Error::remote(call, CallFailure::Revert(reason.to_string()))
    }

    fn token(&self, call: &'static str, token: &ContractHandle) -> Result<(String, u8)> {
        self.tokens
            .get(&token.address())
            .cloned()
            .ok_or_else(|| Self::revert(call, ""))
    }
}

#[async_trait]
impl ChainReader for MockReader {
    async fn symbol(&self, token: &ContractHandle) -> Result<String> {
        self.record("symbol");
        if let Some(delay) = self.token_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.token("symbol", token)?.0)
    }

    async fn decimals(&self, token: &ContractHandle) -> Result<u8> {
        self.record("decimals");
        if let Some(delay) = self.token_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.token("decimals", token)?.1)
    }

    async fn balance_of(&self, token: &ContractHandle, owner: Address) -> Result<U256> {
        self.record("balanceOf");
        Ok(self
            .balances
            .get(&(token.address(), owner))
            .copied()
            .unwrap_or_default())
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.record("eth_getBalance");
        Ok(self.native_balances.get(&owner).copied().unwrap_or_default())
    }

    async fn get_pool(
        &self,
        _factory: &ContractHandle,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Address> {
        self.record("getPool");
        Ok(self
            .pools
            .get(&(token_a, token_b, fee))
            .or_else(|| self.pools.get(&(token_b, token_a, fee)))
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn slot0(&self, pool: &ContractHandle) -> Result<Slot0> {
        self.record("slot0");
        self.slot0
            .get(&pool.address())
            .copied()
            .ok_or_else(|| Self::revert("slot0", ""))
    }

    async fn fee_growth_global0(&self, pool: &ContractHandle) -> Result<U256> {
        self.record("feeGrowthGlobal0X128");
        Ok(self
            .fee_growth_global
            .get(&pool.address())
            .map(|(global0, _)| *global0)
            .unwrap_or_default())
    }

    async fn fee_growth_global1(&self, pool: &ContractHandle) -> Result<U256> {
        self.record("feeGrowthGlobal1X128");
        Ok(self
            .fee_growth_global
            .get(&pool.address())
            .map(|(_, global1)| *global1)
            .unwrap_or_default())
    }

    async fn tick_fee_growth(&self, pool: &ContractHandle, tick: i32) -> Result<TickFeeGrowth> {
        self.record("ticks");
        Ok(self
            .ticks
            .get(&(pool.address(), tick))
            .copied()
            .unwrap_or_default())
    }

    async fn token_of_owner_by_index(
        &self,
        _manager: &ContractHandle,
        owner: Address,
        index: U256,
    ) -> Result<U256> {
        self.record("tokenOfOwnerByIndex");
        if let Some((at, failure)) = self.enumeration_failures.get(&owner) {
            if U256::from(*at) == index {
                return Err(Error::remote("tokenOfOwnerByIndex", failure.clone()));
            }
        }

        let owned = self.owned.get(&owner).map(Vec::as_slice).unwrap_or_default();
        usize::try_from(index)
            .ok()
            .and_then(|i| owned.get(i))
            .copied()
            .ok_or_else(|| Self::revert("tokenOfOwnerByIndex", "EnumerableSet: index out of bounds"))
    }

    async fn position(&self, _manager: &ContractHandle, token_id: U256) -> Result<RawPosition> {
        self.record("positions");
        self.positions
            .get(&token_id)
            .cloned()
            .ok_or_else(|| Self::revert("positions", "Invalid token ID"))
    }
}

//! Remote reads against the contracts the engine values positions with.
//!
//! [`ChainReader`] is the single seam between the valuation engine and a
//! chain. [`RpcReader`] implements it over JSON-RPC `eth_call` with alloy.

use std::{future::Future, time::Duration};

use alloy::{
    contract::Error as ContractError,
    primitives::{
        aliases::{I24, U24},
        Address, Bytes, U256,
    },
    providers::{DynProvider, Provider, ProviderBuilder},
    sol_types::{decode_revert_reason, SolCall},
    transports::{RpcError, TransportError},
};
use async_trait::async_trait;
use log::warn;
use url::Url;

use crate::{
    abis::{INonfungiblePositionManager, IUniswapV3Factory, IUniswapV3Pool, IERC20},
    chain::binder::ContractHandle,
    config::RpcSettings,
    error::{CallFailure, Error, Result},
    models::RawPosition,
};

/// Current price state of a pool (`slot0()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// Fee growth recorded on the far side of an initialised tick (`ticks(tick)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickFeeGrowth {
    pub fee_growth_outside0_x128: U256,
    pub fee_growth_outside1_x128: U256,
}

/// Read-only view of one chain.
///
/// Every method is a single remote read and the only place the engine
/// suspends. Implementations must report contract reverts as
/// [`CallFailure::Revert`] so callers can tell them from transport errors.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn symbol(&self, token: &ContractHandle) -> Result<String>;

    async fn decimals(&self, token: &ContractHandle) -> Result<u8>;

    async fn balance_of(&self, token: &ContractHandle, owner: Address) -> Result<U256>;

    /// Native asset balance of `owner`, in wei.
    async fn native_balance(&self, owner: Address) -> Result<U256>;

    /// Pool address for the pair and fee tier, zero address if none exists.
    async fn get_pool(
        &self,
        factory: &ContractHandle,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Address>;

    async fn slot0(&self, pool: &ContractHandle) -> Result<Slot0>;

    async fn fee_growth_global0(&self, pool: &ContractHandle) -> Result<U256>;

    async fn fee_growth_global1(&self, pool: &ContractHandle) -> Result<U256>;

    async fn tick_fee_growth(&self, pool: &ContractHandle, tick: i32) -> Result<TickFeeGrowth>;

    /// NFT id of the `index`-th position owned by `owner`. Reverts once
    /// `index` reaches the owner's position count.
    async fn token_of_owner_by_index(
        &self,
        manager: &ContractHandle,
        owner: Address,
        index: U256,
    ) -> Result<U256>;

    async fn position(&self, manager: &ContractHandle, token_id: U256) -> Result<RawPosition>;
}

// ============================================
// JSON-RPC implementation
// ============================================

/// [`ChainReader`] over an HTTP JSON-RPC endpoint.
///
/// Each call is bounded by a timeout and transport failures are retried with
/// exponential backoff. Reverts are returned immediately.
#[derive(Clone)]
pub struct RpcReader {
    provider: DynProvider,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl RpcReader {
    pub fn new(rpc_url: &str, settings: &RpcSettings) -> Result<Self> {
        let url = Url::parse(rpc_url).map_err(|e| {
            Error::remote("connect", CallFailure::Transport(format!("invalid RPC URL: {e}")))
        })?;

        let client = ProviderBuilder::new().connect_http(url);

        Ok(Self::with_provider(DynProvider::new(client), settings))
    }

    pub fn with_provider(provider: DynProvider, settings: &RpcSettings) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries.max(1),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
        }
    }

    /// Run `f` with timeout and retry, mapping failures with `classify`.
    async fn with_retry<T, E, F, Fut>(
        &self,
        call: &'static str,
        classify: fn(&'static str, E) -> Error,
        f: F,
    ) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            let err = match tokio::time::timeout(self.timeout, f()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => classify(call, e),
                Err(_) => Error::remote(call, CallFailure::Timeout),
            };

            attempt += 1;
            if !err.is_transient() || attempt >= self.max_retries {
                return Err(err);
            }

            let delay = backoff_delay(self.retry_delay, attempt);
            warn!("{err}; retrying in {delay:?} (attempt {attempt}/{})", self.max_retries);
            tokio::time::sleep(delay).await;
        }
    }
}

/// `base * 2^(attempt - 1)`, saturating instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Empty revert data is a bare revert. Data that is not an `Error(string)`
/// or `Panic(uint256)` payload (custom errors) is kept undecoded.
fn revert_failure(data: Bytes) -> CallFailure {
    if data.is_empty() {
        return CallFailure::Revert(String::new());
    }

    match decode_revert_reason(&data) {
        Some(reason) => CallFailure::Revert(reason),
        None => CallFailure::RevertData(data),
    }
}

/// Split an `eth_call` failure into revert and transport failures.
fn classify_contract_error(call: &'static str, err: ContractError) -> Error {
    if let Some(data) = err.as_revert_data() {
        return Error::remote(call, revert_failure(data));
    }

    if let ContractError::TransportError(transport) = &err {
        if let Some(reason) = revert_message(transport) {
            return Error::remote(call, CallFailure::Revert(reason));
        }
    }

    Error::remote(call, CallFailure::Transport(err.to_string()))
}

fn classify_transport_error(call: &'static str, err: TransportError) -> Error {
    match revert_message(&err) {
        Some(reason) => Error::remote(call, CallFailure::Revert(reason)),
        None => Error::remote(call, CallFailure::Transport(err.to_string())),
    }
}

/// Nodes that omit revert data still answer with an "execution reverted"
/// JSON-RPC error message.
fn revert_message(err: &TransportError) -> Option<String> {
    let RpcError::ErrorResp(payload) = err else {
        return None;
    };

    revert_reason_from_message(&payload.message)
}

fn revert_reason_from_message(message: &str) -> Option<String> {
    message
        .strip_prefix("execution reverted")
        .map(|rest| rest.trim_start_matches(':').trim().to_string())
}

fn check_kind(handle: &ContractHandle, signature: &str) {
    debug_assert!(
        handle.kind().interface().contains(&signature),
        "{} does not implement {signature}",
        handle.kind()
    );
}

#[async_trait]
impl ChainReader for RpcReader {
    async fn symbol(&self, token: &ContractHandle) -> Result<String> {
        check_kind(token, IERC20::symbolCall::SIGNATURE);
        let contract = IERC20::new(token.address(), &self.provider);
        self.with_retry(IERC20::symbolCall::SIGNATURE, classify_contract_error, || async {
            contract.symbol().call().await
        })
        .await
    }

    async fn decimals(&self, token: &ContractHandle) -> Result<u8> {
        check_kind(token, IERC20::decimalsCall::SIGNATURE);
        let contract = IERC20::new(token.address(), &self.provider);
        self.with_retry(IERC20::decimalsCall::SIGNATURE, classify_contract_error, || async {
            contract.decimals().call().await
        })
        .await
    }

    async fn balance_of(&self, token: &ContractHandle, owner: Address) -> Result<U256> {
        check_kind(token, IERC20::balanceOfCall::SIGNATURE);
        let contract = IERC20::new(token.address(), &self.provider);
        self.with_retry(IERC20::balanceOfCall::SIGNATURE, classify_contract_error, || async {
            contract.balanceOf(owner).call().await
        })
        .await
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.with_retry("eth_getBalance", classify_transport_error, || async {
            self.provider.get_balance(owner).await
        })
        .await
    }

    async fn get_pool(
        &self,
        factory: &ContractHandle,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Address> {
        check_kind(factory, IUniswapV3Factory::getPoolCall::SIGNATURE);
        let fee = U24::try_from(fee).map_err(|_| {
            Error::remote(
                IUniswapV3Factory::getPoolCall::SIGNATURE,
                CallFailure::Transport(format!("fee tier {fee} does not fit uint24")),
            )
        })?;
        let contract = IUniswapV3Factory::new(factory.address(), &self.provider);
        self.with_retry(IUniswapV3Factory::getPoolCall::SIGNATURE, classify_contract_error, || async {
            contract.getPool(token_a, token_b, fee).call().await
        })
        .await
    }

    async fn slot0(&self, pool: &ContractHandle) -> Result<Slot0> {
        check_kind(pool, IUniswapV3Pool::slot0Call::SIGNATURE);
        let contract = IUniswapV3Pool::new(pool.address(), &self.provider);
        let slot0 = self
            .with_retry(IUniswapV3Pool::slot0Call::SIGNATURE, classify_contract_error, || async {
                contract.slot0().call().await
            })
            .await?;

        Ok(Slot0 {
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            tick: slot0.tick.as_i32(),
        })
    }

    async fn fee_growth_global0(&self, pool: &ContractHandle) -> Result<U256> {
        check_kind(pool, IUniswapV3Pool::feeGrowthGlobal0X128Call::SIGNATURE);
        let contract = IUniswapV3Pool::new(pool.address(), &self.provider);
        self.with_retry(
            IUniswapV3Pool::feeGrowthGlobal0X128Call::SIGNATURE,
            classify_contract_error,
            || async { contract.feeGrowthGlobal0X128().call().await },
        )
        .await
    }

    async fn fee_growth_global1(&self, pool: &ContractHandle) -> Result<U256> {
        check_kind(pool, IUniswapV3Pool::feeGrowthGlobal1X128Call::SIGNATURE);
        let contract = IUniswapV3Pool::new(pool.address(), &self.provider);
        self.with_retry(
            IUniswapV3Pool::feeGrowthGlobal1X128Call::SIGNATURE,
            classify_contract_error,
            || async { contract.feeGrowthGlobal1X128().call().await },
        )
        .await
    }

    async fn tick_fee_growth(&self, pool: &ContractHandle, tick: i32) -> Result<TickFeeGrowth> {
        check_kind(pool, IUniswapV3Pool::ticksCall::SIGNATURE);
        let index = I24::try_from(tick).map_err(|_| {
            Error::remote(
                IUniswapV3Pool::ticksCall::SIGNATURE,
                CallFailure::Transport(format!("tick {tick} does not fit int24")),
            )
        })?;
        let contract = IUniswapV3Pool::new(pool.address(), &self.provider);
        let info = self
            .with_retry(IUniswapV3Pool::ticksCall::SIGNATURE, classify_contract_error, || async {
                contract.ticks(index).call().await
            })
            .await?;

        Ok(TickFeeGrowth {
            fee_growth_outside0_x128: info.feeGrowthOutside0X128,
            fee_growth_outside1_x128: info.feeGrowthOutside1X128,
        })
    }

    async fn token_of_owner_by_index(
        &self,
        manager: &ContractHandle,
        owner: Address,
        index: U256,
    ) -> Result<U256> {
        check_kind(manager, INonfungiblePositionManager::tokenOfOwnerByIndexCall::SIGNATURE);
        let contract = INonfungiblePositionManager::new(manager.address(), &self.provider);
        self.with_retry(
            INonfungiblePositionManager::tokenOfOwnerByIndexCall::SIGNATURE,
            classify_contract_error,
            || async { contract.tokenOfOwnerByIndex(owner, index).call().await },
        )
        .await
    }

    async fn position(&self, manager: &ContractHandle, token_id: U256) -> Result<RawPosition> {
        check_kind(manager, INonfungiblePositionManager::positionsCall::SIGNATURE);
        let contract = INonfungiblePositionManager::new(manager.address(), &self.provider);
        let p = self
            .with_retry(
                INonfungiblePositionManager::positionsCall::SIGNATURE,
                classify_contract_error,
                || async { contract.positions(token_id).call().await },
            )
            .await?;

        Ok(RawPosition {
            token_id,
            nonce: U256::from(p.nonce),
            operator: p.operator,
            token0: p.token0,
            token1: p.token1,
            fee: p.fee.to::<u32>(),
            tick_lower: p.tickLower.as_i32(),
            tick_upper: p.tickUpper.as_i32(),
            liquidity: p.liquidity,
            fee_growth_inside0_last_x128: p.feeGrowthInside0LastX128,
            fee_growth_inside1_last_x128: p.feeGrowthInside1LastX128,
            tokens_owed0: p.tokensOwed0,
            tokens_owed1: p.tokensOwed1,
        })
    }
}

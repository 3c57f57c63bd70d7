//! Network registry.
//!
//! One [`NetworkConnection`] per configured chain, created at startup and
//! shared for the lifetime of the process. RPC endpoints come from
//! [`Settings`]; contract addresses and tracked assets are constants.

use std::sync::Arc;

use alloy::primitives::{address, Address};
use serde::Serialize;

use crate::{
    chain::{ChainReader, RpcReader},
    config::Settings,
    error::Result,
};

/// Supported networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NetworkLabel {
    L1,
    Arbitrum,
}

/// Hardcoded per-network contract addresses.
#[derive(Debug, Clone, Copy)]
pub struct NetworkMetadata {
    pub name: &'static str,
    pub factory: Address,
    pub position_manager: Address,
    /// Reference USD stablecoin used as quote token
    pub usd_stablecoin: Address,
    pub wrapped_native: Address,
    /// ERC-20 balances included in the wallet valuation
    pub tracked_assets: &'static [Address],
}

// Uniswap V3 deploys the factory and position manager at the same address
// on Ethereum and Arbitrum One.
const UNISWAP_V3_FACTORY: Address = address!("1f98431c8ad98523631ae4a59f267346ea31f984");
const NONFUNGIBLE_POSITION_MANAGER: Address = address!("c36442b4a4522e871399cd717abdd847ab11fe88");

const L1_USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
const L1_WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

const L1_TRACKED_ASSETS: &[Address] = &[
    L1_USDC,
    L1_WETH,
    address!("dac17f958d2ee523a2206206994597c13d831ec7"), // USDT
    address!("6b175474e89094c44da98b954eedeac495271d0f"), // DAI
    address!("2260fac5e5542a773aa44fbcfedf7c193bc2c599"), // WBTC
];

const ARBITRUM_USDC: Address = address!("af88d065e77c8cc2239327c5edb3a432268e5831");
const ARBITRUM_WETH: Address = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");

const ARBITRUM_TRACKED_ASSETS: &[Address] = &[
    ARBITRUM_USDC,
    ARBITRUM_WETH,
    address!("fd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9"), // USDT
    address!("da10009cbd5d07dd0cecc66161fc93d7c9000da1"), // DAI
    address!("912ce59144191c1204e64559fe8253a0e49e6548"), // ARB
];

impl NetworkLabel {
    pub const ALL: [NetworkLabel; 2] = [NetworkLabel::L1, NetworkLabel::Arbitrum];

    pub fn metadata(&self) -> NetworkMetadata {
        match self {
            NetworkLabel::L1 => NetworkMetadata {
                name: "Ethereum mainnet L1",
                factory: UNISWAP_V3_FACTORY,
                position_manager: NONFUNGIBLE_POSITION_MANAGER,
                usd_stablecoin: L1_USDC,
                wrapped_native: L1_WETH,
                tracked_assets: L1_TRACKED_ASSETS,
            },
            NetworkLabel::Arbitrum => NetworkMetadata {
                name: "Arbitrum One L2",
                factory: UNISWAP_V3_FACTORY,
                position_manager: NONFUNGIBLE_POSITION_MANAGER,
                usd_stablecoin: ARBITRUM_USDC,
                wrapped_native: ARBITRUM_WETH,
                tracked_assets: ARBITRUM_TRACKED_ASSETS,
            },
        }
    }

    /// RPC endpoint for this network from settings.
    pub fn rpc_url<'a>(&self, settings: &'a Settings) -> &'a str {
        match self {
            NetworkLabel::L1 => &settings.l1_rpc_url,
            NetworkLabel::Arbitrum => &settings.arbitrum_rpc_url,
        }
    }
}

/// One chain the engine can read from. Immutable after construction.
#[derive(Clone)]
pub struct NetworkConnection {
    pub name: String,
    pub label: NetworkLabel,
    pub reader: Arc<dyn ChainReader>,
    pub factory: Address,
    pub position_manager: Address,
    pub usd_stablecoin: Address,
    pub wrapped_native: Address,
    pub tracked_assets: Vec<Address>,
}

impl NetworkConnection {
    /// Connection with the label's hardcoded metadata.
    pub fn new(label: NetworkLabel, reader: Arc<dyn ChainReader>) -> Self {
        let metadata = label.metadata();
        Self {
            name: metadata.name.to_string(),
            label,
            reader,
            factory: metadata.factory,
            position_manager: metadata.position_manager,
            usd_stablecoin: metadata.usd_stablecoin,
            wrapped_native: metadata.wrapped_native,
            tracked_assets: metadata.tracked_assets.to_vec(),
        }
    }
}

impl std::fmt::Debug for NetworkConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkConnection")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("factory", &self.factory)
            .field("position_manager", &self.position_manager)
            .field("usd_stablecoin", &self.usd_stablecoin)
            .field("wrapped_native", &self.wrapped_native)
            .field("tracked_assets", &self.tracked_assets)
            .finish_non_exhaustive()
    }
}

/// Build the registry of every supported network from settings.
pub fn build_networks(settings: &Settings) -> Result<Vec<NetworkConnection>> {
    NetworkLabel::ALL
        .iter()
        .map(|label| {
            let reader = RpcReader::new(label.rpc_url(settings), &settings.rpc)?;
            Ok(NetworkConnection::new(*label, Arc::new(reader)))
        })
        .collect()
}

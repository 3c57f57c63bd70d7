//! Contract binding.
//!
//! A [`ContractHandle`] pairs a contract kind with a concrete address. Binding
//! never touches the network: well-known kinds resolve their address from the
//! network's constants, ad-hoc kinds take a caller-supplied address.

use std::str::FromStr;

use alloy::{primitives::Address, sol_types::SolCall};

use crate::{
    abis::{INonfungiblePositionManager, IUniswapV3Factory, IUniswapV3Pool, IERC20},
    chain::NetworkConnection,
    error::{Error, Result},
};

/// Contract interfaces the engine reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// UniswapV3Factory, one fixed address per network
    Factory,
    /// NonfungiblePositionManager, one fixed address per network
    PositionManager,
    /// UniswapV3Pool, discovered through the factory
    Pool,
    /// Any ERC-20 token
    Erc20,
}

impl ContractKind {
    /// Function signatures of the embedded interface for this kind.
    pub fn interface(&self) -> &'static [&'static str] {
        match self {
            ContractKind::Factory => &[IUniswapV3Factory::getPoolCall::SIGNATURE],
            ContractKind::PositionManager => &[
                INonfungiblePositionManager::tokenOfOwnerByIndexCall::SIGNATURE,
                INonfungiblePositionManager::positionsCall::SIGNATURE,
            ],
            ContractKind::Pool => &[
                IUniswapV3Pool::slot0Call::SIGNATURE,
                IUniswapV3Pool::feeGrowthGlobal0X128Call::SIGNATURE,
                IUniswapV3Pool::feeGrowthGlobal1X128Call::SIGNATURE,
                IUniswapV3Pool::ticksCall::SIGNATURE,
            ],
            ContractKind::Erc20 => &[
                IERC20::symbolCall::SIGNATURE,
                IERC20::decimalsCall::SIGNATURE,
                IERC20::balanceOfCall::SIGNATURE,
            ],
        }
    }

    /// Network-specific constant address, for kinds that have one.
    pub fn well_known_address(&self, network: &NetworkConnection) -> Option<Address> {
        match self {
            ContractKind::Factory => Some(network.factory),
            ContractKind::PositionManager => Some(network.position_manager),
            ContractKind::Pool | ContractKind::Erc20 => None,
        }
    }
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractKind::Factory => write!(f, "UniswapV3Factory"),
            ContractKind::PositionManager => write!(f, "NonfungiblePositionManager"),
            ContractKind::Pool => write!(f, "UniswapV3Pool"),
            ContractKind::Erc20 => write!(f, "ERC20"),
        }
    }
}

/// Where a contract lives.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// The network's constant address for the kind
    WellKnown,
    /// A hex string, checksummed or not
    Hex(&'a str),
    /// An address already decoded from another call
    Address(Address),
}

/// A contract kind bound to an address, ready to be read through a
/// [`ChainReader`](crate::chain::ChainReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractHandle {
    kind: ContractKind,
    address: Address,
}

impl ContractHandle {
    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

/// Parse a 20-byte hex address, with or without `0x` and checksum casing.
pub fn parse_address(value: &str) -> Result<Address> {
    Address::from_str(value.trim()).map_err(|_| Error::InvalidAddress(value.to_string()))
}

/// Bind `kind` at `target` on `network`.
pub fn bind(network: &NetworkConnection, kind: ContractKind, target: Target<'_>) -> Result<ContractHandle> {
    let address = match target {
        Target::WellKnown => kind
            .well_known_address(network)
            .ok_or_else(|| Error::InvalidAddress(format!("{kind} has no well-known address")))?,
        Target::Hex(value) => parse_address(value)?,
        Target::Address(address) => address,
    };

    Ok(ContractHandle { kind, address })
}

//! Wallet balance valuation.

use alloy::primitives::Address;
use futures::future::try_join_all;
use log::debug;

use crate::{
    chain::{bind, ContractKind, NetworkConnection, Target},
    error::Result,
    tracker::UsdQuoter,
    utils::u256_to_f64,
};

const NATIVE_DECIMALS: u8 = 18;

/// Native balance, valued through the wrapped native token.
async fn native_balance_in_usd(network: &NetworkConnection, quoter: &UsdQuoter, owner: Address, fee: u32) -> Result<f64> {
    let wei = network.reader.native_balance(owner).await?;
    if wei.is_zero() {
        return Ok(0.0);
    }

    let amount = u256_to_f64(wei, NATIVE_DECIMALS);
    quoter.quote_usd(network, network.wrapped_native, amount, fee).await
}

async fn token_balance_in_usd(
    network: &NetworkConnection,
    quoter: &UsdQuoter,
    token: Address,
    owner: Address,
    fee: u32,
) -> Result<f64> {
    let handle = bind(network, ContractKind::Erc20, Target::Address(token))?;
    let balance = network.reader.balance_of(&handle, owner).await?;
    if balance.is_zero() {
        return Ok(0.0);
    }

    let info = quoter.cache().get_token_info(network, token).await?;
    let amount = u256_to_f64(balance, info.decimals);
    let usd = quoter.quote_usd(network, token, amount, fee).await?;

    debug!("{}: {owner} holds {amount} {} (${usd:.2})", network.name, info.symbol);
    Ok(usd)
}

/// USD value of the owner's native balance plus every tracked ERC-20 balance
/// on `network`. Balances are read fresh on every call.
pub async fn fetch_assets_balance_in_usd(
    network: &NetworkConnection,
    quoter: &UsdQuoter,
    owner: Address,
    fee: u32,
) -> Result<f64> {
    let tokens = try_join_all(
        network
            .tracked_assets
            .iter()
            .map(|token| token_balance_in_usd(network, quoter, *token, owner, fee)),
    );

    let (native, tokens) = tokio::try_join!(native_balance_in_usd(network, quoter, owner, fee), tokens)?;

    Ok(native + tokens.iter().sum::<f64>())
}

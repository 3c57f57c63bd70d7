//! Position discovery through the position manager's owner enumeration.
//!
//! `tokenOfOwnerByIndex(owner, i)` is queried for i = 0, 1, 2, ... until it
//! reverts with an out-of-bounds error. That revert ends the sequence; every
//! other failure is a real error.

use alloy::primitives::{Address, U256};
use futures::{stream, Stream, TryStreamExt};
use log::info;

use crate::{
    chain::{bind, ContractHandle, ContractKind, NetworkConnection, Target},
    error::{Error, Result},
    models::RawPosition,
};

/// Out-of-bounds reverts from OpenZeppelin's `EnumerableSet` and
/// `ERC721Enumerable`. Some nodes drop the reason and return a bare revert.
/// Undecoded revert data is not a reason and never matches.
fn is_enumeration_end(err: &Error) -> bool {
    err.revert_reason()
        .is_some_and(|reason| reason.is_empty() || reason.contains("index out of bounds"))
}

async fn token_at(
    network: &NetworkConnection,
    manager: &ContractHandle,
    owner: Address,
    index: u64,
) -> Result<U256> {
    network
        .reader
        .token_of_owner_by_index(manager, owner, U256::from(index))
        .await
        .map_err(|err| {
            if is_enumeration_end(&err) {
                Error::DiscoveryComplete
            } else {
                err
            }
        })
}

/// Lazily yields the owner's positions in enumeration order. Each position is
/// fetched only when the stream is polled for it.
pub fn discover(
    network: &NetworkConnection,
    owner: Address,
) -> impl Stream<Item = Result<RawPosition>> + '_ {
    stream::try_unfold(0u64, move |index| async move {
        let manager = bind(network, ContractKind::PositionManager, Target::WellKnown)?;

        let token_id = match token_at(network, &manager, owner, index).await {
            Ok(token_id) => token_id,
            Err(Error::DiscoveryComplete) => return Ok(None),
            Err(err) => return Err(err),
        };

        let position = network.reader.position(&manager, token_id).await?;
        Ok(Some((position, index + 1)))
    })
}

/// Every position currently owned by `owner` on `network`.
pub async fn fetch_all(network: &NetworkConnection, owner: Address) -> Result<Vec<RawPosition>> {
    let positions: Vec<RawPosition> = discover(network, owner).try_collect().await?;
    info!("{}: {} positions owned by {owner}", network.name, positions.len());
    Ok(positions)
}

pub mod binder;
pub mod network;
pub mod reader;

#[cfg(test)]
pub(crate) mod mock;

pub use binder::{bind, parse_address, ContractHandle, ContractKind, Target};
pub use network::{build_networks, NetworkConnection, NetworkLabel, NetworkMetadata};
pub use reader::{ChainReader, RpcReader, Slot0, TickFeeGrowth};

use alloy::primitives::{Address, Bytes};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single remote read did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallFailure {
    /// The contract executed and reverted. Carries the decoded reason, empty
    /// when the node returned a bare revert.
    Revert(String),
    /// The contract reverted with data that is not a reason string, such as
    /// a custom error.
    RevertData(Bytes),
    /// The request never produced a contract-level answer (connection, HTTP,
    /// JSON-RPC or decoding error).
    Transport(String),
    Timeout,
}

impl std::fmt::Display for CallFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallFailure::Revert(reason) if reason.is_empty() => write!(f, "execution reverted"),
            CallFailure::Revert(reason) => write!(f, "execution reverted: {reason}"),
            CallFailure::RevertData(data) => write!(f, "execution reverted with data {data}"),
            CallFailure::Transport(message) => write!(f, "{message}"),
            CallFailure::Timeout => write!(f, "timed out"),
        }
    }
}

/// Errors surfaced by the valuation engine.
///
/// `DiscoveryComplete` is an internal control signal: position discovery
/// converts it into the end of the sequence, so callers of the public entry
/// points never observe it.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("remote call {call} failed: {failure}")]
    RemoteCall {
        call: &'static str,
        failure: CallFailure,
    },

    #[error("no liquidity pool for {token}/{quote} at fee tier {fee}")]
    NoLiquidityPool {
        token: Address,
        quote: Address,
        fee: u32,
    },

    #[error("position enumeration complete")]
    DiscoveryComplete,
}

impl Error {
    pub fn remote(call: &'static str, failure: CallFailure) -> Self {
        Error::RemoteCall { call, failure }
    }

    /// Revert reason if this is a contract-level revert with a decoded (or
    /// empty) reason. Undecoded revert data has no reason.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Error::RemoteCall {
                failure: CallFailure::Revert(reason),
                ..
            } => Some(reason),
            _ => None,
        }
    }

    /// Transport failures and timeouts may succeed when repeated; reverts and
    /// local errors never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::RemoteCall {
                failure: CallFailure::Transport(_) | CallFailure::Timeout,
                ..
            }
        )
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod ot;

/// The two roles of an oblivious transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Party {
    Sender,
    Receiver,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Sender => write!(f, "sender"),
            Party::Receiver => write!(f, "receiver"),
        }
    }
}

/// Errors raised by the protocol.
///
/// Every error aborts the instance it came from. A caller that wants to
/// retry must start a new sender/receiver pair with fresh randomness.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorOT {
    /// Constructor arguments outside their domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A round was invoked out of order, twice, or after the instance ended.
    #[error("{party} cannot run {operation} in state {state}")]
    ProtocolState {
        party: Party,
        operation: &'static str,
        state: &'static str,
    },
    /// A hash-chain verification failed.
    #[error("{0} check failed")]
    ConsistencyCheckFailed(Party),
    /// A value cannot be encoded or converted.
    #[error("encoding error: {0}")]
    Encoding(String),
}

use alloy::sol_types::{Revert as SolRevert, SolError};
use thiserror::Error;

/// Revert reason the BUSD token uses when the spender's allowance is too low.
pub const ALLOWANCE_EXCEEDED_REASON: &str = "BEP20: transfer amount exceeds allowance";

const REVERT_PREFIX: &str = "execution reverted: ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("allowance exceeded")]
    AllowanceExceeded,

    #[error("reverted: {0}")]
    Reverted(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("read-only session: no signer configured")]
    ReadOnly,

    #[error("no account available: configure a private key or watch address")]
    NoAccount,
}

impl ChainError {
    pub fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc(err.to_string())
    }
}

impl From<alloy::contract::Error> for ChainError {
    fn from(err: alloy::contract::Error) -> Self {
        let revert_data = err.as_revert_data();
        let message = match &err {
            alloy::contract::Error::TransportError(e) => {
                e.as_error_resp().map(|payload| payload.message.to_string())
            }
            _ => None,
        };

        match classify_revert(message.as_deref(), revert_data.as_ref().map(|b| b.as_ref())) {
            Some(Revert::AllowanceExceeded) => ChainError::AllowanceExceeded,
            Some(Revert::Other(reason)) => ChainError::Reverted(reason),
            None => ChainError::Contract(err.to_string()),
        }
    }
}

/// Classified revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    AllowanceExceeded,
    Other(String),
}

/// Classify a failed call from the node's error message and revert data.
///
/// Revert data wins when it decodes as `Error(string)`: the bare reason is
/// compared exactly. Without data, only the exact
/// `execution reverted: <reason>` message counts. Returns None when the error
/// is not a revert at all.
pub fn classify_revert(message: Option<&str>, revert_data: Option<&[u8]>) -> Option<Revert> {
    if let Some(data) = revert_data {
        if let Ok(revert) = SolRevert::abi_decode(data) {
            return Some(revert_from_reason(&revert.reason));
        }
    }

    let message = message?;
    if let Some(reason) = message.strip_prefix(REVERT_PREFIX) {
        return Some(revert_from_reason(reason));
    }
    if message == "execution reverted" {
        return Some(Revert::Other(message.to_string()));
    }
    None
}

fn revert_from_reason(reason: &str) -> Revert {
    if reason == ALLOWANCE_EXCEEDED_REASON {
        Revert::AllowanceExceeded
    } else {
        Revert::Other(reason.to_string())
    }
}

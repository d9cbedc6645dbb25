use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No reply arrived for `address` with the given index prefix.
    ///
    /// `bridge_error` carries the last `/live/error` message AbletonOSC sent
    /// while the call was waiting, if any.
    #[error("no reply to {address} {prefix:?} within {timeout:?}{}", bridge_error.as_ref().map(|e| format!(" (bridge reported: {e})")).unwrap_or_default())]
    Timeout {
        address: String,
        prefix: Vec<i32>,
        timeout: Duration,
        bridge_error: Option<String>,
    },
    #[error("malformed OSC datagram: {0}")]
    Protocol(#[from] rosc::OscError),
    #[error("unexpected reply on {address}: {reason}")]
    UnexpectedReply { address: String, reason: String },
    #[error("invalid argument `{name}`: {reason}")]
    Validation { name: String, reason: String },
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("client is shut down")]
    Closed,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn validation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnexpectedReply {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call could succeed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

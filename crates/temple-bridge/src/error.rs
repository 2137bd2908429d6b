//! Error types for the bridge endpoints.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Request body is not a JSON object
    #[error("bad json")]
    BadJson,

    #[error("missing token")]
    MissingToken,

    #[error("unknown token")]
    UnknownToken,

    /// Session storage failed
    #[error("store error: {0}")]
    Store(String),

    /// Outbound message could not be delivered
    #[error("send failed: {0}")]
    Send(String),
}

impl BridgeError {
    /// HTTP status the endpoint answers with.
    pub fn status(&self) -> u16 {
        match self {
            BridgeError::BadJson | BridgeError::MissingToken | BridgeError::UnknownToken => 400,
            BridgeError::Store(_) => 500,
            BridgeError::Send(_) => 502,
        }
    }

    /// Short error string placed in the JSON body. Internal details stay in the log.
    pub fn public_message(&self) -> &'static str {
        match self {
            BridgeError::BadJson => "bad json",
            BridgeError::MissingToken => "missing token",
            BridgeError::UnknownToken => "unknown token",
            BridgeError::Store(_) => "store unavailable",
            BridgeError::Send(_) => "send failed",
        }
    }
}

/// Failure of the client-side finish relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The page was not opened through a bot link
    #[error("no linked token")]
    NotLinked,

    #[error("transport failed: {0}")]
    Transport(String),

    /// The endpoint answered, but not with `ok: true`
    #[error("rejected with status {status}")]
    Rejected { status: u16, body: serde_json::Value },
}

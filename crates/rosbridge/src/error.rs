use std::time::Duration;

/// Failures surfaced by the bridge client.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Connection to {url} failed: {reason}")]
    Connection { url: String, reason: String },
    #[error("Receive timeout after {timeout:?} waiting for a message on '{topic}'")]
    Timeout { topic: String, timeout: Duration },
    #[error("Malformed bridge message: {0}")]
    Malformed(String),
    #[error("Bridge connection is closed")]
    Closed,
    #[error("Transport error: {0}")]
    Transport(String),
}

impl BridgeError {
    /// Whether this error denotes an elapsed receive window.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }
}

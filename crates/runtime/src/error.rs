//! Error types for the runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur while running a gateway or proxy session.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// None of the configured relays accepted a connection.
    #[error("no relay could be reached")]
    NoRelayReachable,

    /// Every relay connection has since dropped.
    #[error("all relay connections were lost")]
    AllRelaysLost,

    /// WebSocket-level failure.
    #[error("relay transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The target command could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The target command terminated with a failure status.
    #[error("target {program} exited with {status}")]
    ChildFailed {
        program: String,
        status: std::process::ExitStatus,
    },

    /// A pipe to the target process was unavailable.
    #[error("target process stdio unavailable")]
    ChildStdio,

    /// Forwarding a request to a URL target failed.
    #[error("forwarding to target URL failed: {0}")]
    Forward(#[from] reqwest::Error),

    /// The configured private key is not usable key material.
    #[error("private key is not a 64-character hex string")]
    InvalidPrivateKey,

    /// Envelope encoding or decoding failed.
    #[error("envelope codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Transport error taxonomy.

use thiserror::Error;

/// Errors surfaced by the registrar and hosting transports.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Network-level failure before a response body was decoded.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote system answered with a business-level failure code.
    #[error("remote error {code}: {message}")]
    Api {
        /// Result code reported by the remote system.
        code: i64,
        /// Human-readable message reported by the remote system.
        message: String,
    },

    /// The response body did not match the expected envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
}

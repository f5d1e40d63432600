//! Error types for the ledgerbot-gateway crate.

use thiserror::Error;

/// Alias for `Result<T, GatewayError>`.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the Telegram client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP transport failed (connect, timeout, TLS).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Telegram answered `ok: false`.
    #[error("telegram api error in `{method}` (code {code}): {description}")]
    Api {
        method: String,
        code: i64,
        description: String,
    },

    /// The API response body did not have the expected shape.
    #[error("malformed response from `{method}`: {reason}")]
    MalformedResponse { method: String, reason: String },
}

//! Error types for the ledgerbot-store crate.
//!
//! All range operations return [`StoreError`] via [`StoreResult`].  Each
//! variant carries enough context for callers to decide how to handle the
//! failure without inspecting opaque strings.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the tabular store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The HTTP transport failed (connect, timeout, TLS).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("sheets api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The service-account key file could not be read or parsed.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The token exchange with the OAuth endpoint failed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The API response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for HubLink integrations.
///
/// The flow-level variants all surface to API callers as client errors
/// (HTTP 400) with a human-readable detail string. Infrastructure carriers
/// (`Store`, `Network`, `Config`) map to server-side status codes.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum IntegrationError {
    /// The provider redirected back with an `error` parameter.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The callback request is missing `code` or `state`.
    #[error("Missing code or state parameter")]
    MalformedCallback,

    /// The `state` query parameter could not be decoded.
    #[error("Failed to decode state parameter: {0}")]
    StateDecode(String),

    /// The returned state token does not match the stored one (CSRF defense).
    #[error("State does not match")]
    StateMismatch,

    /// The provider rejected the authorization-code exchange. Carries the
    /// provider's raw response body for diagnostics.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// No stored credential exists for this `(org_id, user_id)`.
    #[error("No HubSpot credentials found")]
    NoCredential,

    /// The credential lacks a usable `access_token`.
    #[error("No access token found in credentials")]
    MissingAccessToken,

    /// A caller-supplied payload could not be parsed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntegrationError {
    /// HTTP status code this error maps to at the API boundary.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AuthorizationDenied(_)
            | Self::MalformedCallback
            | Self::StateDecode(_)
            | Self::StateMismatch
            | Self::TokenExchangeFailed(_)
            | Self::NoCredential
            | Self::MissingAccessToken
            | Self::InvalidInput(_) => 400,
            Self::Network(_) => 502,
            Self::Store(_) | Self::Config(_) => 500,
        }
    }
}

/// Result type alias for HubLink operations
pub type Result<T> = std::result::Result<T, IntegrationError>;

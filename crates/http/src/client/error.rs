//! Client error types

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Access token expired and could not be renewed for this request
    #[error("Access token expired")]
    TokenExpired,

    /// Access token rejected for a reason other than expiry
    #[error("Access token invalid: {0}")]
    TokenInvalid(String),

    /// Session is unusable in a server render; the page must redirect
    #[error("Authentication token rejected")]
    AuthToken,

    /// The shared refresh attempt failed
    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[source] Arc<ClientError>),

    /// The refresh call did not finish in time
    #[error("Token refresh timed out after {0:?}")]
    RefreshTimeout(Duration),

    /// The refresh task went away without reporting an outcome
    #[error("Token refresh was abandoned")]
    RefreshAbandoned,

    /// The session was signed out while the refresh was running
    #[error("Session ended during token refresh")]
    SessionEnded,

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from a non-401 HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether this is the server-render auth signal
    pub const fn is_auth_token(&self) -> bool {
        matches!(self, Self::AuthToken)
    }

    /// Whether the session can no longer be used
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            Self::AuthToken
                | Self::TokenInvalid(_)
                | Self::RefreshFailed(_)
                | Self::RefreshTimeout(_)
                | Self::RefreshAbandoned
                | Self::SessionEnded
        )
    }
}

use thiserror::Error;

use mdedit_shared::MdEditError;
use mdedit_store::StoreError;

/// Errors surfaced by the client layer.
///
/// Network failures are values, not panics: every [`crate::api::DocumentApi`]
/// call returns one of these and callers decide how to degrade.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Server responded {status}")]
    Status { status: u16 },

    /// No session, expired session, or the owner is unknown.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The body did not have the expected shape.
    #[error("{0}")]
    Decode(#[from] MdEditError),

    /// The render endpoint refused or failed an export.
    #[error("Export failed: {0}")]
    Export(String),

    #[error("Preferences error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ClientError::from_status(status.as_u16()),
            None => ClientError::Network(e.to_string()),
        }
    }
}

impl ClientError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ClientError::NotAuthenticated,
            status => ClientError::Status { status },
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

//! Error types for the Mailcast client

use reqwest::StatusCode;
use thiserror::Error;

use crate::response::ResponseBody;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Fallback when a status has no canonical reason phrase
const GENERIC_FAILURE: &str = "Request failed";

/// A remote call that did not produce a usable result.
///
/// Every variant carries a message fit to show the operator as-is.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-success status from the remote service
    #[error("{message}")]
    Status { status: u16, message: String },

    /// No response received
    #[error("{0}")]
    Transport(String),

    /// Successful status, but the body was not what the endpoint promises
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Build the failure for a non-success response.
    ///
    /// Prefers the `message` field of a JSON body, then the status reason phrase.
    pub fn from_status(status: StatusCode, body: &ResponseBody) -> Self {
        let message = body
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| status_description(status));

        ClientError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Build the failure for a request that never got a response
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ClientError::Transport("Request timeout".to_string())
        } else if error.is_connect() {
            ClientError::Transport(format!("Connection error: {}", error))
        } else {
            ClientError::Transport(format!("Request failed: {}", error))
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// Canonical reason phrase, e.g. "Internal Server Error"
pub fn status_description(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or(GENERIC_FAILURE)
        .to_string()
}

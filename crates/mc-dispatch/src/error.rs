//! Dispatch error types

use mc_client::ClientError;
use mc_common::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Why a dispatch (or template save) did not happen
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Rejected locally; no request was issued
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request was issued and failed
    #[error(transparent)]
    Request(#[from] ClientError),
}

impl DispatchError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Human-readable text suitable for the operator
    pub fn message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Request(e) => e.message(),
        }
    }
}

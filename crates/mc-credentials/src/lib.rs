//! Mailcast Credential Storage
//!
//! Holds the operator's bearer credential between requests and across process
//! restarts. Backends:
//! - Durable JSON file (default)
//! - In-memory (tests, ephemeral sessions)
//!
//! Store operations never fail from the caller's point of view. A backend that
//! cannot read or write logs a warning and behaves as if no credential exists,
//! which downstream is the same as being logged out.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("Unknown credentials backend: {0}")]
    UnknownBackend(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Holder of the current bearer credential. At most one value is live.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current credential, if any
    async fn get(&self) -> Option<String>;

    /// Replace the credential. An empty token clears the store.
    async fn set(&self, token: &str);

    /// Remove the credential
    async fn clear(&self);

    /// Backend name
    fn name(&self) -> &str;

    async fn is_authenticated(&self) -> bool {
        self.get().await.is_some()
    }
}

/// Create a store for the configured backend
pub fn create_store(backend: &str, path: PathBuf) -> Result<Arc<dyn CredentialStore>, CredentialsError> {
    match backend {
        "file" => {
            info!(?path, "Using file credential store");
            Ok(Arc::new(FileCredentialStore::new(path)))
        }
        "memory" => {
            info!("Using in-memory credential store");
            Ok(Arc::new(MemoryCredentialStore::new()))
        }
        other => Err(CredentialsError::UnknownBackend(other.to_string())),
    }
}

/// Tokens that are empty or whitespace never count as a credential
pub(crate) fn normalize(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

//! In-memory credential store

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{normalize, CredentialStore};

/// Process-local store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(normalize(token)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    async fn set(&self, token: &str) {
        *self.token.write() = normalize(token);
    }

    async fn clear(&self) {
        *self.token.write() = None;
    }

    fn name(&self) -> &str {
        "memory"
    }
}

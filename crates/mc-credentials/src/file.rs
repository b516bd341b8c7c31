//! Durable credential store backed by a JSON file

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{normalize, CredentialStore, CredentialsError};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    #[serde(default)]
    access_token: Option<String>,
}

/// Credential persisted at a fixed path.
///
/// The file is re-read on every `get` so a login from another process is
/// picked up by the next request.
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<String>, CredentialsError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredCredential = serde_json::from_slice(&content)?;
        Ok(stored.access_token.as_deref().and_then(normalize))
    }

    async fn write(&self, token: &str) -> Result<(), CredentialsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let stored = StoredCredential {
            access_token: Some(token.to_string()),
        };
        let output = serde_json::to_vec_pretty(&stored)?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &output).await?;
        restrict_permissions(&tmp_path).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(path = ?self.path, "Saved credential");
        Ok(())
    }

    async fn remove(&self) -> Result<(), CredentialsError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = ?self.path, "Removed credential");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Option<String> {
        match self.read().await {
            Ok(token) => token,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Credential file unreadable, treating as logged out");
                None
            }
        }
    }

    async fn set(&self, token: &str) {
        let Some(token) = normalize(token) else {
            self.clear().await;
            return;
        };

        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.write(&token).await {
            warn!(path = ?self.path, error = %e, "Failed to persist credential, discarding the previous one");
            if let Err(e) = self.remove().await {
                warn!(path = ?self.path, error = %e, "Failed to remove previous credential");
            }
        }
    }

    async fn clear(&self) {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.remove().await {
            warn!(path = ?self.path, error = %e, "Failed to remove credential");
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

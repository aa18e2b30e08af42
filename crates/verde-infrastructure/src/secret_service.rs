//! Secret service implementation.
//!
//! Wraps [`SecretStorage`] behind the `SecretService` trait and caches the
//! loaded configuration to avoid repeated file I/O.

use std::sync::Arc;

use tokio::sync::RwLock;
use verde_core::config::SecretConfig;
use verde_core::secret::SecretService;

use crate::secret_storage::SecretStorage;

/// File-backed secret service with in-memory caching.
#[derive(Clone)]
pub struct FileSecretService {
    /// Cached secret config, loaded lazily on first access.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    storage: Arc<SecretStorage>,
}

impl FileSecretService {
    /// Creates a service bound to the default secret path.
    ///
    /// # Errors
    ///
    /// Returns an error when the config directory cannot be resolved.
    /// A missing secret file is not an error here; it surfaces on load.
    pub fn new() -> verde_core::error::Result<Self> {
        Ok(Self::with_storage(SecretStorage::new()?))
    }

    /// Creates a service over a custom storage (for testing).
    pub fn with_storage(storage: SecretStorage) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            storage: Arc::new(storage),
        }
    }
}

#[async_trait::async_trait]
impl SecretService for FileSecretService {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        {
            let cached = self.secrets.read().await;
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let config = self
            .storage
            .load()
            .map_err(|e| format!("Failed to load secret configuration: {e}"))?;

        let mut cached = self.secrets.write().await;
        *cached = Some(config.clone());
        tracing::debug!("[FileSecretService] Secret configuration loaded and cached");
        Ok(config)
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_secrets_caches_first_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini": {"api_key": "k-1"}}"#).unwrap();

        let service = FileSecretService::with_storage(SecretStorage::with_path(path.clone()));
        let first = service.load_secrets().await.unwrap();
        assert_eq!(first.gemini.unwrap().api_key, "k-1");

        // A rewrite after the first load is not observed: the cache answers.
        std::fs::write(&path, r#"{"gemini": {"api_key": "k-2"}}"#).unwrap();
        let second = service.load_secrets().await.unwrap();
        assert_eq!(second.gemini.unwrap().api_key, "k-1");
    }

    #[tokio::test]
    async fn test_missing_file_reports_error_without_secrets() {
        let temp_dir = TempDir::new().unwrap();
        let service = FileSecretService::with_storage(SecretStorage::with_path(
            temp_dir.path().join("secret.json"),
        ));

        assert!(!service.secret_file_exists().await);
        let err = service.load_secrets().await.unwrap_err();
        assert!(err.contains("secret configuration"));
    }
}

//! Secret configuration file storage.
//!
//! Provides read-only loading of secret configuration from
//! `~/.config/verde/secret.json`.

use std::fs;
use std::path::PathBuf;

use verde_core::VerdeError;
use verde_core::config::SecretConfig;
use verde_core::error::Result;

/// Storage for the secret configuration file (`secret.json`).
///
/// Responsibilities:
/// - Locate and read `secret.json` from the Verde config directory
/// - Parse its JSON content into the `SecretConfig` domain model
///
/// Does NOT:
/// - Write or modify secret files (read-only)
/// - Validate API keys or credentials
///
/// # Security Note
///
/// The file is plaintext JSON; it should carry restrictive permissions
/// (e.g., 600) to prevent unauthorized access.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a storage bound to the default secret path.
    ///
    /// # Errors
    ///
    /// Returns `VerdeError::Config` when the platform config directory
    /// cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: crate::paths::VerdePaths::secret_file()?,
        })
    }

    /// Creates a storage bound to a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads and parses the secret configuration.
    ///
    /// # Errors
    ///
    /// - `VerdeError::NotFound` when the file doesn't exist
    /// - `VerdeError::Io` when the file cannot be read
    /// - `VerdeError::Serialization` when the content is not valid JSON
    pub fn load(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            return Err(VerdeError::not_found(
                "secret file",
                self.path.display().to_string(),
            ));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Returns the path this storage reads from.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SecretStorage::with_path(temp_dir.path().join("secret.json"));

        let result = storage.load();
        assert!(matches!(result, Err(VerdeError::NotFound { .. })));
    }

    #[test]
    fn test_load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(&path, r#"{"gemini": {"api_key": "k-abc", "model": "gemini-2.5-flash"}}"#)
            .unwrap();

        let storage = SecretStorage::with_path(path);
        let config = storage.load().unwrap();
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "k-abc");
        assert_eq!(gemini.model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(&path, "{not json").unwrap();

        let storage = SecretStorage::with_path(path);
        let result = storage.load();
        assert!(matches!(result, Err(VerdeError::Serialization { .. })));
    }
}

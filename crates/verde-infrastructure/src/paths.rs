//! Unified path management for Verde configuration files.
//!
//! All Verde configuration and secrets live under the platform config
//! directory (e.g. `~/.config/verde/` on Linux).

use std::path::PathBuf;

use verde_core::VerdeError;
use verde_core::error::Result;

const APP_DIR_NAME: &str = "verde";
const SECRET_FILE_NAME: &str = "secret.json";

/// Unified path management for Verde.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/verde/             # Config directory
/// └── secret.json              # API keys
/// ```
pub struct VerdePaths;

impl VerdePaths {
    /// Returns the Verde configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `VerdeError::Config` when the platform config directory
    /// cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| VerdeError::config("Cannot determine config directory"))
    }

    /// Returns the path to the secret file (`secret.json`).
    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SECRET_FILE_NAME))
    }
}

//! Secret configuration model.
//!
//! Mirrors the on-disk shape of `secret.json`. Only the Gemini section is
//! defined today; the top level stays a struct so further providers can be
//! added without a format break.

use serde::{Deserialize, Serialize};

/// Root of the secret configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Gemini API credentials, absent until the user configures them.
    pub gemini: Option<GeminiConfig>,
}

/// Credentials and overrides for the Gemini API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key for the generative-AI endpoint.
    pub api_key: String,
    /// Optional model override; the client supplies its default otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

//! Plant identification client.
//!
//! Sends a photo plus a fixed instruction to the Gemini API, constrained to
//! a declared JSON schema, and parses the reply into a [`PlantProfile`].
//! Configuration priority: ~/.config/verde/secret.json > environment
//! variables.

use std::env;

use reqwest::Client;
use verde_core::VerdeError;
use verde_core::analyzer::PlantAnalyzer;
use verde_core::error::Result;
use verde_core::media::EncodedImage;
use verde_core::plant::{PlantProfile, UNKNOWN_PLANT_NAME};
use verde_infrastructure::SecretStorage;

use crate::gemini::{
    BASE_URL, Content, DEFAULT_GEMINI_MODEL, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, InlineDataPayload, Part, candidate_text, read_error_response,
};

/// Instruction sent with every identification request. Asks for the plant's
/// name, description, history, and six labeled care steps.
const IDENTIFY_INSTRUCTION: &str = r#"Identify the plant in this image. Provide a concise, engaging description, a paragraph about its history, and a list of detailed, actionable care steps for a beginner.
Return the response as a JSON object with the following structure:
{
  "plantName": "The common name of the plant",
  "description": "A brief, one-paragraph description of the plant.",
  "history": "A paragraph about the origin and history of the plant.",
  "careSteps": [
    "Light: Detailed instructions on how much light the plant needs (e.g., 'bright, indirect light for 6-8 hours a day').",
    "Watering: Specific advice on watering frequency and technique (e.g., 'Water every 1-2 weeks, allowing soil to dry out between waterings.').",
    "Soil: The ideal type of soil mix (e.g., 'Well-draining potting mix with perlite.').",
    "Fertilizer: Guidance on when and what to feed the plant (e.g., 'Feed with a balanced liquid fertilizer every 4 weeks during the growing season.').",
    "Humidity: Information on the plant's humidity preferences (e.g., 'Prefers high humidity; consider misting or using a humidifier.').",
    "Pruning: Tips on how and when to prune (e.g., 'Prune yellow or dead leaves as needed to encourage new growth.')."
  ]
}
If you cannot identify the plant, return a JSON object with "plantName": "Unknown Plant", "error": "Could not identify the plant.""#;

/// Declared output schema for the identification reply.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "plantName": { "type": "STRING" },
            "description": { "type": "STRING" },
            "history": { "type": "STRING" },
            "careSteps": { "type": "ARRAY", "items": { "type": "STRING" } },
            "error": { "type": "STRING" },
        },
    })
}

/// Client for the schema-constrained identification call.
#[derive(Clone)]
pub struct PlantIdentifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl PlantIdentifier {
    /// Creates a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Loads configuration from secret.json or environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/verde/secret.json
    /// 2. Environment variables (GEMINI_API_KEY, GEMINI_MODEL_NAME)
    ///
    /// Model name defaults to `gemini-2.5-flash` if not specified.
    ///
    /// # Errors
    ///
    /// Returns `VerdeError::Config` when no API key resolves; the process
    /// must not start serving without one.
    pub fn try_from_env() -> Result<Self> {
        if let Ok(storage) = SecretStorage::new()
            && let Ok(config) = storage.load()
            && let Some(gemini) = config.gemini
        {
            let model = gemini
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
            return Ok(Self::new(gemini.api_key, model));
        }

        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            VerdeError::config(
                "GEMINI_API_KEY not found in ~/.config/verde/secret.json or environment variables",
            )
        })?;
        let model =
            env::var("GEMINI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the endpoint base URL (used to point tests at a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Identifies the plant in the image.
    ///
    /// Never fails past this boundary: a service-reported "cannot identify"
    /// comes back as a profile with `error` set, and any transport or parse
    /// failure becomes the generic analysis-failure profile.
    pub async fn identify(&self, image: &EncodedImage) -> PlantProfile {
        match self.request_analysis(image).await {
            Ok(text) => match parse_profile(&text) {
                Ok(profile) => profile,
                Err(err) => {
                    tracing::error!("[PlantIdentifier] Malformed identification reply: {err}");
                    PlantProfile::analysis_failure()
                }
            },
            Err(err) => {
                tracing::error!("[PlantIdentifier] Identification request failed: {err}");
                PlantProfile::analysis_failure()
            }
        }
    }

    async fn request_analysis(&self, image: &EncodedImage) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                    Part::Text {
                        text: IDENTIFY_INSTRUCTION.to_string(),
                    },
                ],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            }),
        };

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| VerdeError::api(None, format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(read_error_response(response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| VerdeError::api(None, format!("Failed to parse Gemini response: {err}")))?;

        candidate_text(parsed).ok_or_else(|| {
            VerdeError::api(None, "Gemini API returned no text in the response candidates")
        })
    }
}

/// Parses the schema-constrained reply text into a profile.
///
/// Missing fields default to empty values; an absent plant name becomes
/// "Unknown Plant".
fn parse_profile(text: &str) -> Result<PlantProfile> {
    let mut profile: PlantProfile = serde_json::from_str(text.trim())?;
    if profile.plant_name.is_empty() {
        profile.plant_name = UNKNOWN_PLANT_NAME.to_string();
    }
    Ok(profile)
}

#[async_trait::async_trait]
impl PlantAnalyzer for PlantIdentifier {
    async fn analyze(&self, image: &EncodedImage) -> PlantProfile {
        self.identify(image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_preserves_care_steps() {
        let text = r#"{
            "plantName": "Pothos",
            "description": "A hardy trailing vine.",
            "history": "Native to the Society Islands.",
            "careSteps": ["Light: bright, indirect", "Watering: every 1-2 weeks"]
        }"#;
        let profile = parse_profile(text).unwrap();

        assert_eq!(profile.plant_name, "Pothos");
        assert_eq!(profile.care_steps.len(), 2);
        assert!(profile.is_identified());
    }

    #[test]
    fn test_parse_profile_defaults_missing_name() {
        let profile = parse_profile(r#"{"description": "something leafy"}"#).unwrap();
        assert_eq!(profile.plant_name, UNKNOWN_PLANT_NAME);
    }

    #[test]
    fn test_parse_profile_rejects_non_json() {
        assert!(parse_profile("not json at all").is_err());
    }

    #[test]
    fn test_response_schema_declares_all_fields() {
        let schema = response_schema();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["plantName", "description", "history", "careSteps", "error"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
        assert_eq!(properties["careSteps"]["items"]["type"], "STRING");
    }
}

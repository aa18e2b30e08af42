//! Gemini REST wire types shared by the identification and chat clients.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use verde_core::VerdeError;

/// Model used when the configuration does not name one.
pub(crate) const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Base URL for the Gemini model endpoints.
pub(crate) const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part content block carrying plain text.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineDataPayload {
    pub mime_type: String,
    pub data: String,
}

/// Output constraints attached to an identification request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

#[derive(Deserialize)]
pub(crate) struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<ContentResponse>,
}

#[derive(Deserialize)]
pub(crate) struct ContentResponse {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
pub(crate) struct PartResponse {
    pub text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Concatenates the text parts of the first candidate, if any.
pub(crate) fn candidate_text(response: GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates?.into_iter().next()?;
    let parts = candidate.content?.parts;

    let mut text = String::new();
    for part in parts {
        if let Some(fragment) = part.text {
            text.push_str(&fragment);
        }
    }
    if text.is_empty() { None } else { Some(text) }
}

/// Maps a non-success HTTP response body to a `VerdeError::Api`.
///
/// The Gemini error envelope (`{"error": {"status", "message", ...}}`) is
/// unwrapped when present; otherwise the raw body is carried verbatim.
pub(crate) fn map_http_error(status: StatusCode, body: String) -> VerdeError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    VerdeError::api(Some(status.as_u16()), message)
}

/// Reads a failed response's body and maps it to a `VerdeError::Api`.
pub(crate) async fn read_error_response(response: reqwest::Response) -> VerdeError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
    map_http_error(status, body)
}

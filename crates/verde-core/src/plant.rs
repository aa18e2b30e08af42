//! Plant identification results.
//!
//! The identification service answers with a structured profile: the plant's
//! common name, a short description, a history paragraph, and a list of
//! labeled care steps. A profile can also carry a service-reported error,
//! in which case it must not be historized or used to start a chat greeting.

use serde::{Deserialize, Serialize};

/// Name used when the service could not identify the subject.
pub const UNKNOWN_PLANT_NAME: &str = "Unknown Plant";

/// Name used when the analysis failed before producing a result.
pub const ANALYSIS_FAILURE_NAME: &str = "Error";

/// Message shown when the analysis failed for a local or transport reason.
pub const ANALYSIS_FAILURE_MESSAGE: &str =
    "An unexpected error occurred while analyzing the image. Please try again.";

/// A structured identification result for a single plant photo.
///
/// Field names follow the wire format of the identification response, so a
/// profile deserializes directly from the service's JSON answer. Absent
/// fields default to empty values rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlantProfile {
    /// The common name of the plant.
    pub plant_name: String,
    /// A brief, one-paragraph description.
    pub description: String,
    /// A paragraph about the origin and history of the plant.
    pub history: String,
    /// Labeled care steps ("Light: ...", "Watering: ...", ...).
    pub care_steps: Vec<String>,
    /// Set when the service could not identify the subject, or when the
    /// analysis failed outright.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlantProfile {
    /// Returns `true` when the profile represents a successful
    /// identification (no error attached).
    pub fn is_identified(&self) -> bool {
        self.error.is_none()
    }

    /// Builds the fallback profile returned when analysis fails before the
    /// service produced an answer (transport or parse failure).
    pub fn analysis_failure() -> Self {
        Self {
            plant_name: ANALYSIS_FAILURE_NAME.to_string(),
            error: Some(ANALYSIS_FAILURE_MESSAGE.to_string()),
            ..Self::default()
        }
    }
}

/// Splits a labeled care step like `"Light: bright, indirect"` into its
/// category and instruction.
///
/// Returns `None` when the step carries no label.
pub fn split_care_step(step: &str) -> Option<(&str, &str)> {
    let (category, instruction) = step.split_once(':')?;
    Some((category, instruction.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let profile: PlantProfile =
            serde_json::from_str(r#"{"plantName": "Pothos"}"#).unwrap();

        assert_eq!(profile.plant_name, "Pothos");
        assert_eq!(profile.description, "");
        assert_eq!(profile.history, "");
        assert!(profile.care_steps.is_empty());
        assert!(profile.is_identified());
    }

    #[test]
    fn test_service_error_marks_profile_unidentified() {
        let profile: PlantProfile = serde_json::from_str(
            r#"{"plantName": "Unknown Plant", "error": "Could not identify the plant."}"#,
        )
        .unwrap();

        assert!(!profile.is_identified());
        assert_eq!(profile.plant_name, UNKNOWN_PLANT_NAME);
    }

    #[test]
    fn test_analysis_failure_profile() {
        let profile = PlantProfile::analysis_failure();

        assert_eq!(profile.plant_name, ANALYSIS_FAILURE_NAME);
        assert_eq!(profile.error.as_deref(), Some(ANALYSIS_FAILURE_MESSAGE));
        assert!(profile.care_steps.is_empty());
    }

    #[test]
    fn test_split_care_step() {
        assert_eq!(
            split_care_step("Light: bright, indirect light"),
            Some(("Light", "bright, indirect light"))
        );
        assert_eq!(split_care_step("just a note"), None);
    }
}

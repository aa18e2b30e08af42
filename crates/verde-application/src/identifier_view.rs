//! Identifier view state machine and upload orchestration.
//!
//! The view moves `Idle → Analyzing → {Result, Errored}` and back to
//! `Analyzing` on the next upload. Successful identifications are recorded
//! in the client-local history together with the preview image; failed ones
//! never touch it.

use std::path::Path;

use uuid::Uuid;
use verde_core::VerdeError;
use verde_core::analyzer::PlantAnalyzer;
use verde_core::error::Result;
use verde_core::history::{HistoryEntry, IdentificationHistory};
use verde_core::media::EncodedImage;
use verde_core::plant::PlantProfile;

/// Phases of the identifier view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisPhase {
    /// No image selected yet.
    #[default]
    Idle,
    /// An identification request is in flight.
    Analyzing,
    /// A successful identification is displayed.
    Result,
    /// A failed identification is displayed.
    Errored,
}

/// State behind the identification surface.
#[derive(Debug, Default)]
pub struct IdentifierView {
    phase: AnalysisPhase,
    preview: Option<String>,
    profile: Option<PlantProfile>,
    error: Option<String>,
    history: IdentificationHistory,
}

impl IdentifierView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// The displayed image as a `data:` URI, if any.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// The displayed identification result, if any.
    pub fn profile(&self) -> Option<&PlantProfile> {
        self.profile.as_ref()
    }

    /// The displayed failure message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &IdentificationHistory {
        &self.history
    }

    /// Starts a new analysis: prior result and error are cleared
    /// immediately, before any asynchronous work begins.
    pub fn begin_analysis(&mut self) {
        self.profile = None;
        self.error = None;
        self.phase = AnalysisPhase::Analyzing;
    }

    /// Completes an analysis with the profile and the preview that produced
    /// it.
    ///
    /// An identified profile is displayed and recorded in the history; a
    /// profile carrying a service error is displayed as a failure and the
    /// history stays untouched.
    pub fn finish(&mut self, profile: PlantProfile, image_data_uri: String) {
        self.preview = Some(image_data_uri.clone());

        match profile.error.clone() {
            Some(message) => {
                tracing::debug!("[IdentifierView] Analysis failed: {message}");
                self.profile = None;
                self.error = Some(message);
                self.phase = AnalysisPhase::Errored;
            }
            None => {
                self.history.record(profile.clone(), image_data_uri);
                self.profile = Some(profile);
                self.error = None;
                self.phase = AnalysisPhase::Result;
            }
        }
    }

    /// Records a failure that happened before any profile was produced
    /// (e.g. the image file could not be read).
    pub fn fail(&mut self, message: impl Into<String>) {
        self.profile = None;
        self.error = Some(message.into());
        self.phase = AnalysisPhase::Errored;
    }

    /// Restores a history entry's image and record into view state, clearing
    /// any active error. No network call is made.
    ///
    /// Returns `false` when no entry with that id exists.
    pub fn restore(&mut self, id: Uuid) -> bool {
        let Some(entry) = self.history.get(id) else {
            return false;
        };
        let HistoryEntry {
            profile,
            image_data_uri,
            ..
        } = entry.clone();

        self.preview = Some(image_data_uri);
        self.profile = Some(profile);
        self.error = None;
        self.phase = AnalysisPhase::Result;
        true
    }

    /// The user explicitly asked for deeper chat follow-up on the displayed
    /// result. Yields the profile to hand off, only when one is displayed.
    pub fn request_tips(&self) -> Option<PlantProfile> {
        match self.phase() {
            AnalysisPhase::Result => self.profile.clone(),
            _ => None,
        }
    }
}

/// Runs one upload: encodes the preview and identifies the plant.
///
/// The preview encode and the identification call run concurrently; the
/// caller-facing completion point awaits the preview task explicitly, so a
/// history append that follows can never observe a missing preview.
///
/// # Errors
///
/// Propagates a failed file read (`VerdeError::Io`). Remote failures do not
/// surface here; the analyzer folds them into the returned profile.
pub async fn analyze_upload<A: PlantAnalyzer>(
    analyzer: &A,
    path: impl AsRef<Path>,
) -> Result<(PlantProfile, String)> {
    let path = path.as_ref().to_path_buf();

    let preview_path = path.clone();
    let preview_task = tokio::spawn(async move { EncodedImage::from_path(&preview_path).await });

    let image = EncodedImage::from_path(&path).await?;
    let profile = analyzer.analyze(&image).await;

    let preview = preview_task
        .await
        .map_err(|err| VerdeError::internal(format!("Preview encoding task failed: {err}")))??;

    Ok((profile, preview.data_uri()))
}

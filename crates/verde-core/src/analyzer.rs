//! Plant analysis service trait.

use crate::media::EncodedImage;
use crate::plant::PlantProfile;

/// Service that identifies the plant in an encoded image.
///
/// The trait is infallible at this boundary on purpose: implementations map
/// every transport or parse failure into a profile carrying an error, so
/// callers surface failures inline instead of propagating them.
#[async_trait::async_trait]
pub trait PlantAnalyzer: Send + Sync {
    /// Identifies the plant in the image and returns its profile.
    ///
    /// A profile with `error` set represents a recoverable, user-visible
    /// failure (unidentifiable subject, transport error, malformed answer).
    async fn analyze(&self, image: &EncodedImage) -> PlantProfile;
}

//! Client-local identification history.
//!
//! Each successful identification is retained together with the image that
//! produced it, so the user can bring a past result back into view without
//! re-issuing a network call. The history lives in memory only and is lost
//! when the session ends.

use uuid::Uuid;

use crate::plant::PlantProfile;

/// A past identification result paired with the image that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: Uuid,
    /// The identification result.
    pub profile: PlantProfile,
    /// The uploaded image as a `data:` URI, exactly as previewed.
    pub image_data_uri: String,
}

/// Ordered collection of identification results, newest first.
///
/// Entries are only ever prepended; nothing is removed.
#[derive(Debug, Default)]
pub struct IdentificationHistory {
    entries: Vec<HistoryEntry>,
}

impl IdentificationHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful identification at the front of the history.
    ///
    /// Callers must only record identified profiles; a profile carrying a
    /// service error never reaches the history.
    pub fn record(&mut self, profile: PlantProfile, image_data_uri: String) -> &HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            profile,
            image_data_uri,
        };
        self.entries.insert(0, entry);
        // Safe to index because we just inserted at the front
        &self.entries[0]
    }

    /// Returns the entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Returns the number of recorded identifications.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> PlantProfile {
        PlantProfile {
            plant_name: name.to_string(),
            ..PlantProfile::default()
        }
    }

    #[test]
    fn test_record_prepends() {
        let mut history = IdentificationHistory::new();
        history.record(profile("Pothos"), "data:image/png;base64,AAAA".to_string());
        history.record(profile("Monstera"), "data:image/png;base64,BBBB".to_string());

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].profile.plant_name, "Monstera");
        assert_eq!(history.entries()[1].profile.plant_name, "Pothos");
    }

    #[test]
    fn test_get_returns_exact_entry() {
        let mut history = IdentificationHistory::new();
        let uri = "data:image/jpeg;base64,CCCC".to_string();
        let id = history.record(profile("Ficus"), uri.clone()).id;

        let entry = history.get(id).unwrap();
        assert_eq!(entry.profile.plant_name, "Ficus");
        assert_eq!(entry.image_data_uri, uri);
        assert!(history.get(Uuid::new_v4()).is_none());
    }
}

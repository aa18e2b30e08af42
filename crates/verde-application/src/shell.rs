//! Tab shell and identified-record handoff.
//!
//! The shell passes an identified profile from the identifier view to the
//! chat view as an explicit event: `hand_off` stores it and activates the
//! chat tab, `take_pending` consumes it exactly once, so a re-rendered chat
//! view can never greet the same record twice.

use verde_core::plant::PlantProfile;

/// The two surfaces the shell switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Identifier,
    Chat,
}

/// Top-level shell state.
#[derive(Debug, Default)]
pub struct Shell {
    active: Tab,
    pending: Option<PlantProfile>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Switches the active tab.
    pub fn activate(&mut self, tab: Tab) {
        self.active = tab;
    }

    /// Stores an identified profile for the chat view and switches to the
    /// chat tab.
    pub fn hand_off(&mut self, profile: PlantProfile) {
        self.pending = Some(profile);
        self.active = Tab::Chat;
    }

    /// Consumes the pending profile, if any. Yields it exactly once.
    pub fn take_pending(&mut self) -> Option<PlantProfile> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_off_activates_chat() {
        let mut shell = Shell::new();
        assert_eq!(shell.active(), Tab::Identifier);

        shell.hand_off(PlantProfile {
            plant_name: "Pothos".to_string(),
            ..PlantProfile::default()
        });
        assert_eq!(shell.active(), Tab::Chat);
    }

    #[test]
    fn test_pending_profile_is_taken_exactly_once() {
        let mut shell = Shell::new();
        shell.hand_off(PlantProfile::default());

        assert!(shell.take_pending().is_some());
        // A re-render asking again gets nothing; no duplicate greeting.
        assert!(shell.take_pending().is_none());
    }

    #[test]
    fn test_activate_switches_without_pending() {
        let mut shell = Shell::new();
        shell.activate(Tab::Chat);
        assert_eq!(shell.active(), Tab::Chat);
        assert!(shell.take_pending().is_none());

        shell.activate(Tab::Identifier);
        assert_eq!(shell.active(), Tab::Identifier);
    }
}

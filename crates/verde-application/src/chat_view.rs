//! Chat view state machine.
//!
//! Moves `AwaitingInit → Ready ⇄ Sending`. The transcript is append-only
//! except for the in-place growth of the trailing placeholder while a
//! streamed reply is arriving.

use verde_core::chat::{ChatMessage, MessageRole};
use verde_core::plant::PlantProfile;

/// Fixed welcome seeded when the view initializes.
pub const WELCOME_MESSAGE: &str = "Hello there, fellow plant lover! I'm Verde, and I'm SO excited to help your garden thrive! \u{1F331} What plant are we pampering today? You can ask me anything, like 'Why are my monstera's leaves turning yellow?' or 'How often should I water my succulent?' Let's get growing!";

/// Fixed apology shown when a send or its stream fails.
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Phases of the chat view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    /// The view has not been initialized yet.
    #[default]
    AwaitingInit,
    /// Idle, accepting input.
    Ready,
    /// A streamed reply is in flight.
    Sending,
}

/// State behind the chat surface.
#[derive(Debug, Default)]
pub struct ChatView {
    phase: ChatPhase,
    messages: Vec<ChatMessage>,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// The transcript, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Seeds the welcome message and moves to `Ready`.
    ///
    /// Guarded: happens at most once per view lifetime. Returns `true` only
    /// on the call that actually initialized.
    pub fn initialize(&mut self) -> bool {
        if self.phase != ChatPhase::AwaitingInit {
            return false;
        }
        self.messages.push(ChatMessage::model(WELCOME_MESSAGE));
        self.phase = ChatPhase::Ready;
        true
    }

    /// Appends a model greeting referencing an identified plant, inviting
    /// follow-up questions.
    pub fn greet(&mut self, profile: &PlantProfile) {
        self.messages
            .push(ChatMessage::model(greeting_for(profile)));
    }

    /// Starts a send.
    ///
    /// A no-op (returns `None`, nothing appended) when the text is blank or
    /// a send is already in flight. Otherwise appends the user message plus
    /// an empty model placeholder, enters `Sending`, and returns the text to
    /// transmit.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        if text.trim().is_empty() || self.phase != ChatPhase::Ready {
            return None;
        }

        self.messages.push(ChatMessage::user(text));
        self.messages.push(ChatMessage::model(""));
        self.phase = ChatPhase::Sending;
        Some(text.to_string())
    }

    /// Applies one streamed fragment to the trailing placeholder.
    ///
    /// Fragments must be applied in receipt order; each call appends to
    /// whatever arrived before it.
    pub fn apply_fragment(&mut self, fragment: &str) {
        if self.phase != ChatPhase::Sending {
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            last.content.push_str(fragment);
        }
    }

    /// Completes the in-flight send.
    pub fn finish_send(&mut self) {
        self.phase = ChatPhase::Ready;
    }

    /// Fails the in-flight send: the fixed apology replaces an empty
    /// placeholder, or follows a partially streamed one. The view returns to
    /// `Ready`; the session is not torn down.
    pub fn fail_send(&mut self) {
        match self.messages.last_mut() {
            Some(last) if last.role == MessageRole::Model && last.content.is_empty() => {
                last.content.push_str(APOLOGY_MESSAGE);
            }
            _ => {
                self.messages.push(ChatMessage::model(APOLOGY_MESSAGE));
            }
        }
        self.phase = ChatPhase::Ready;
    }
}

fn greeting_for(profile: &PlantProfile) -> String {
    format!(
        "Oh, a {}! What a gorgeous choice! I see you've already got the basics. I'd be thrilled to share some extra secrets to help it flourish. What are you curious about? You could ask about the best fertilizer, how to propagate it, or maybe common pests to watch out for.",
        profile.plant_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pothos() -> PlantProfile {
        PlantProfile {
            plant_name: "Pothos".to_string(),
            ..PlantProfile::default()
        }
    }

    #[test]
    fn test_initialize_seeds_welcome_once() {
        let mut view = ChatView::new();
        assert!(view.initialize());
        assert!(!view.initialize());

        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].role, MessageRole::Model);
        assert_eq!(view.messages()[0].content, WELCOME_MESSAGE);
        assert_eq!(view.phase(), ChatPhase::Ready);
    }

    #[test]
    fn test_blank_send_is_a_noop() {
        let mut view = ChatView::new();
        view.initialize();

        assert!(view.begin_send("").is_none());
        assert!(view.begin_send("   \t").is_none());
        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.phase(), ChatPhase::Ready);
    }

    #[test]
    fn test_send_while_sending_is_a_noop() {
        let mut view = ChatView::new();
        view.initialize();
        assert!(view.begin_send("first").is_some());
        assert!(view.begin_send("second").is_none());
        assert_eq!(view.messages().len(), 3);
    }

    #[test]
    fn test_fragments_concatenate_in_receipt_order() {
        let mut view = ChatView::new();
        view.initialize();
        view.begin_send("hello");

        view.apply_fragment("Hel");
        view.apply_fragment("lo!");
        view.finish_send();

        let last = view.messages().last().unwrap();
        assert_eq!(last.role, MessageRole::Model);
        assert_eq!(last.content, "Hello!");
        assert_eq!(view.phase(), ChatPhase::Ready);
    }

    #[test]
    fn test_fail_send_replaces_empty_placeholder() {
        let mut view = ChatView::new();
        view.initialize();
        view.begin_send("hello");
        view.fail_send();

        assert_eq!(view.messages().len(), 3);
        assert_eq!(view.messages().last().unwrap().content, APOLOGY_MESSAGE);
        assert_eq!(view.phase(), ChatPhase::Ready);
    }

    #[test]
    fn test_fail_send_keeps_partial_reply() {
        let mut view = ChatView::new();
        view.initialize();
        view.begin_send("hello");
        view.apply_fragment("I was saying");
        view.fail_send();

        let messages = view.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].content, "I was saying");
        assert_eq!(messages[3].content, APOLOGY_MESSAGE);
    }

    #[test]
    fn test_greeting_mentions_plant_name() {
        let mut view = ChatView::new();
        view.initialize();
        view.greet(&pothos());

        let greeting = &view.messages().last().unwrap().content;
        assert_eq!(greeting.matches("Pothos").count(), 1);
    }
}

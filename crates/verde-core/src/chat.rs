//! Conversation message types.
//!
//! This module contains types for representing messages in the care chat,
//! including roles and message content.

use serde::{Deserialize, Serialize};

/// Represents the author of a message in the care chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Model,
}

impl MessageRole {
    /// Returns the role name used by the generative-AI wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

/// A single message in the care chat transcript.
///
/// Each message has a role, content, and a timestamp indicating when it was
/// created. The trailing model message's content grows in place while a
/// streamed reply is still arriving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
}

impl ChatMessage {
    /// Creates a user-authored message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::stamped(MessageRole::User, content)
    }

    /// Creates a model-authored message stamped with the current time.
    pub fn model(content: impl Into<String>) -> Self {
        Self::stamped(MessageRole::Model, content)
    }

    fn stamped(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(MessageRole::User.as_str(), "user");
        assert_eq!(MessageRole::Model.as_str(), "model");
    }

    #[test]
    fn test_constructors_set_role_and_content() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "hello");
        assert!(!msg.timestamp.is_empty());

        let msg = ChatMessage::model("hi!");
        assert_eq!(msg.role, MessageRole::Model);
    }
}

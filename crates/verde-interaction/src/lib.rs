//! Gemini REST client layer for Verde.
//!
//! Two call shapes are implemented against the same wire module:
//! a request/response identification call constrained to a JSON schema,
//! and a request/stream chat call consumed as SSE text fragments.

mod gemini;

pub mod chat;
pub mod identifier;
pub mod persona;

pub use chat::{ChatSession, ReplyStream};
pub use identifier::PlantIdentifier;

//! View state for the Verde application.
//!
//! The views are plain state machines, driven by whatever surface hosts
//! them (the readline REPL today). All remote-call choreography that the
//! views depend on lives in `analyze_upload`.

pub mod chat_view;
pub mod identifier_view;
pub mod shell;

pub use chat_view::{ChatPhase, ChatView};
pub use identifier_view::{AnalysisPhase, IdentifierView, analyze_upload};
pub use shell::{Shell, Tab};

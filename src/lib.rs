//! A terminal chat client for the OpenAI chat completions API.
//!
//! The library half holds everything the `gptchat` binary is made of: the
//! HTTP client, the conversation store, the renderer, and the chat session
//! that ties them together.  Sessions talk to a [`CompletionService`], so
//! they can be driven by something other than the real API.

// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod conversation;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

// Re-exports
pub use client::{API_KEY_ENV, CompletionService, OpenAI};
pub use client_logger::{ClientLogger, StderrLogger};
pub use conversation::{Conversation, DEFAULT_SYSTEM_PROMPT};
pub use error::{Error, MISSING_API_KEY, Result};
pub use observability::register_biometrics;
pub use render::{DEFAULT_CHAR_DELAY, PlainTextRenderer, Renderer};
pub use types::*;

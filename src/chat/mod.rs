//! Chat application module for interactive conversations.
//!
//! This module provides the REPL chat interface built on top of the gptchat
//! client library. It supports:
//!
//! - A running transcript sent in full with every request
//! - Replies rendered with a typing effect
//! - The `exit()` directive and a handful of read-only slash commands
//! - A single-shot mode that answers one prompt and exits
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - `config`: CLI argument parsing and configuration
//! - `session`: Core chat session management and API interaction
//! - `commands`: Exit directive and slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, EXIT_DIRECTIVE, help_text, is_exit_directive, parse_command};
pub use config::{
    ChatArgs, ChatArgsError, ChatConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
    SamplingConfig,
};
pub use session::{ChatSession, Flow, SessionStats, welcome_banner};

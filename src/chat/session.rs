//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! and drives one turn at a time against a [`CompletionService`].
//!
//! A session moves through `AwaitingInput → Processing → Rendering →
//! AwaitingInput` until it sees the exit directive.  [`ChatSession::handle_line`]
//! is one pass through that loop; the caller owns the input source.

use crate::chat::commands::{ChatCommand, help_text, parse_command};
use crate::chat::config::{ChatConfig, SamplingConfig};
use crate::client::CompletionService;
use crate::conversation::Conversation;
use crate::error::Result;
use crate::observability::{SESSION_TURN_ERRORS, SESSION_TURNS};
use crate::render::Renderer;
use crate::types::{Message, Model, Usage};

/// What the input loop should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop reading and exit.
    Exit,
}

/// A chat session that manages conversation state and API interactions.
pub struct ChatSession<S: CompletionService> {
    service: S,
    config: ChatConfig,
    conversation: Conversation,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
    failed_request_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of messages in the conversation, system message included.
    pub message_count: usize,
    /// Completed user/assistant exchanges.
    pub turns: usize,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Requests that failed.
    pub failed_requests: u64,
    /// Prompt tokens across all requests.
    pub total_prompt_tokens: u64,
    /// Completion tokens across all requests.
    pub total_completion_tokens: u64,
    /// Usage reported for the last successful turn, if any.
    pub last_turn_usage: Option<Usage>,
}

/// The startup banner naming the configured model.
pub fn welcome_banner(model: &Model) -> String {
    format!(
        "Welcome to {model} Text Generator made by (Awan),\n\
         Happy chat and talk with your {model} AI Generative Model\n\
         Addhe Warman Putra - (Awan)\n\
         type 'exit()' to exit from program"
    )
}

impl<S: CompletionService> ChatSession<S> {
    /// Creates a new chat session seeded with the configured system prompt.
    pub fn new(service: S, config: ChatConfig) -> Self {
        let conversation = Conversation::new(config.system_prompt.clone());
        Self {
            service,
            config,
            conversation,
            usage_totals: Usage::default(),
            last_turn_usage: None,
            request_count: 0,
            failed_request_count: 0,
        }
    }

    /// Prints the welcome banner.
    pub fn greet(&self, renderer: &mut dyn Renderer) {
        renderer.print_info(&welcome_banner(self.model()));
    }

    /// Sends a user prompt and renders the reply.
    ///
    /// This method:
    /// 1. Appends the user message to the conversation
    /// 2. Sends the whole conversation in one request
    /// 3. Appends the assistant reply to the conversation
    /// 4. Renders the reply
    ///
    /// Returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response carries no text.
    /// The user message is removed again, leaving the conversation exactly as
    /// it was before the call.
    pub async fn send(&mut self, prompt: &str, renderer: &mut dyn Renderer) -> Result<String> {
        let previous_len = self.conversation.len();
        self.conversation.append(Message::user(prompt));

        let params = self.config.sampling.request(self.conversation.snapshot());
        self.request_count = self.request_count.saturating_add(1);
        SESSION_TURNS.click();

        let outcome = match self.service.complete(&params).await {
            Ok(completion) => completion
                .text()
                .map(|text| (text.to_string(), completion.usage)),
            Err(err) => Err(err),
        };

        match outcome {
            Ok((text, usage)) => {
                self.record_usage(usage);
                self.conversation.append(Message::assistant(text.clone()));
                renderer.print_text(&text);
                renderer.finish_response();
                Ok(text)
            }
            Err(err) => {
                self.conversation.truncate(previous_len);
                self.failed_request_count = self.failed_request_count.saturating_add(1);
                SESSION_TURN_ERRORS.click();
                Err(err)
            }
        }
    }

    /// Handles one line read at the prompt.
    ///
    /// The exit directive ends the session without touching the
    /// conversation.  Slash commands are answered locally.  Anything else is
    /// sent as a prompt; a failure is reported through the renderer and the
    /// session carries on.
    pub async fn handle_line(&mut self, line: &str, renderer: &mut dyn Renderer) -> Flow {
        if let Some(command) = parse_command(line) {
            return self.handle_command(command, renderer);
        }
        if line.trim().is_empty() {
            return Flow::Continue;
        }
        if let Err(err) = self.send(line, renderer).await {
            report_error(renderer, &err);
        }
        Flow::Continue
    }

    /// Runs a single prompt without reading input.
    ///
    /// Exits immediately on the exit directive; otherwise performs exactly
    /// one turn.  A failed turn is reported through the renderer and returned.
    pub async fn run_once(&mut self, prompt: &str, renderer: &mut dyn Renderer) -> Result<()> {
        if parse_command(prompt) == Some(ChatCommand::Exit) {
            renderer.print_info("Goodbye!");
            return Ok(());
        }
        match self.send(prompt, renderer).await {
            Ok(_) => Ok(()),
            Err(err) => {
                report_error(renderer, &err);
                Err(err)
            }
        }
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// The configuration the session was created with.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The sampling parameters sent with every request.
    pub fn sampling(&self) -> &SamplingConfig {
        &self.config.sampling
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.sampling.model
    }

    /// Borrows the completion service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.model().clone(),
            message_count: self.conversation.len(),
            turns: self.conversation.turns(),
            total_requests: self.request_count,
            failed_requests: self.failed_request_count,
            total_prompt_tokens: self.usage_totals.prompt_tokens,
            total_completion_tokens: self.usage_totals.completion_tokens,
            last_turn_usage: self.last_turn_usage,
        }
    }

    fn handle_command(&mut self, command: ChatCommand, renderer: &mut dyn Renderer) -> Flow {
        match command {
            ChatCommand::Exit => {
                renderer.print_info("Goodbye!");
                return Flow::Exit;
            }
            ChatCommand::Help => {
                for line in help_text().lines() {
                    renderer.print_info(&format!("    {}", line));
                }
            }
            ChatCommand::Stats => self.print_stats(renderer),
            ChatCommand::ShowConfig => self.print_config(renderer),
            ChatCommand::History => {
                for message in &self.conversation {
                    renderer.print_info(&format!("[{}] {}", message.role, message.content));
                }
            }
            ChatCommand::Invalid(message) => renderer.print_error(&message),
        }
        Flow::Continue
    }

    fn print_stats(&self, renderer: &mut dyn Renderer) {
        let stats = self.stats();
        renderer.print_info("    Session Statistics:");
        renderer.print_info(&format!("      Model: {}", stats.model));
        renderer.print_info(&format!("      Messages: {}", stats.message_count));
        renderer.print_info(&format!("      Turns: {}", stats.turns));
        renderer.print_info(&format!(
            "      Requests: {} ({} failed)",
            stats.total_requests, stats.failed_requests
        ));
        renderer.print_info(&format!(
            "      Total tokens: {} in / {} out",
            stats.total_prompt_tokens, stats.total_completion_tokens
        ));
        if let Some(usage) = stats.last_turn_usage {
            renderer.print_info(&format!(
                "      Last turn tokens: {} in / {} out",
                usage.prompt_tokens, usage.completion_tokens
            ));
        }
    }

    fn print_config(&self, renderer: &mut dyn Renderer) {
        let sampling = self.sampling();
        renderer.print_info("    Current Configuration:");
        renderer.print_info(&format!("      Model: {}", sampling.model));
        renderer.print_info(&format!("      Temperature: {:.2}", sampling.temperature));
        renderer.print_info(&format!("      Max tokens: {}", sampling.max_tokens));
        renderer.print_info(&format!("      Top-p: {:.2}", sampling.top_p));
        renderer.print_info(&format!(
            "      System prompt: {}",
            self.conversation.system_prompt()
        ));
    }

    fn record_usage(&mut self, usage: Option<Usage>) {
        self.last_turn_usage = usage;
        if let Some(usage) = usage {
            self.usage_totals = self.usage_totals + usage;
        }
    }
}

fn report_error(renderer: &mut dyn Renderer, err: &crate::Error) {
    renderer.print_error(&format!("An error occurred: {err}"));
}

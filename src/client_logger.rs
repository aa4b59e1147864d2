//! Logging trait for OpenAI client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`OpenAI`](crate::OpenAI)
//! client, and [`StderrLogger`], the implementation behind `--verbose`.

use std::io::{self, Write};

use serde_json::json;

use crate::error::Error;
use crate::types::{ChatCompletion, ChatCompletionCreateParams};

/// A trait for logging OpenAI client operations.
///
/// Implement this trait to capture and record all API interactions.  Every
/// call to [`OpenAI::send`](crate::OpenAI::send) produces exactly one
/// `log_request` followed by exactly one of `log_response` or `log_error`.
///
/// # Example
///
/// ```rust,ignore
/// use gptchat::{ChatCompletion, ChatCompletionCreateParams, ClientLogger, Error};
/// use std::sync::Mutex;
///
/// struct CountingLogger {
///     requests: Mutex<usize>,
/// }
///
/// impl ClientLogger for CountingLogger {
///     fn log_request(&self, _: &ChatCompletionCreateParams) {
///         *self.requests.lock().unwrap() += 1;
///     }
///
///     fn log_response(&self, _: &ChatCompletion) {}
///
///     fn log_error(&self, _: &Error) {}
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log an outbound request before it is sent.
    fn log_request(&self, params: &ChatCompletionCreateParams);

    /// Log a successfully parsed response.
    fn log_response(&self, completion: &ChatCompletion);

    /// Log a failed request.
    fn log_error(&self, error: &Error);
}

/// Writes one JSON object per line to stderr.
///
/// Stderr keeps the log out of the way of the rendered reply on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl StderrLogger {
    /// Creates a new stderr logger.
    pub fn new() -> Self {
        Self
    }

    fn emit(&self, record: serde_json::Value) {
        let mut stderr = io::stderr().lock();
        // Logging must never take the chat down; drop the line on failure.
        let _ = writeln!(stderr, "{record}");
    }
}

impl ClientLogger for StderrLogger {
    fn log_request(&self, params: &ChatCompletionCreateParams) {
        self.emit(json!({
            "event": "request",
            "model": params.model,
            "messages": params.messages.len(),
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "top_p": params.top_p,
        }));
    }

    fn log_response(&self, completion: &ChatCompletion) {
        self.emit(json!({
            "event": "response",
            "id": completion.id,
            "model": completion.model,
            "choices": completion.choices.len(),
            "finish_reason": completion.choices.first().and_then(|c| c.finish_reason.clone()),
            "usage": completion.usage,
        }));
    }

    fn log_error(&self, error: &Error) {
        self.emit(json!({
            "event": "error",
            "status_code": error.status_code(),
            "message": error.to_string(),
        }));
    }
}

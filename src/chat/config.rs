//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration a session runs with.  The sampling part of the
//! configuration is fixed for the lifetime of a run.

use std::fmt;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::conversation::DEFAULT_SYSTEM_PROMPT;
use crate::render::DEFAULT_CHAR_DELAY;
use crate::types::{ChatCompletionCreateParams, Message, Model};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Default maximum tokens per response.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Default nucleus sampling value.
pub const DEFAULT_TOP_P: f32 = 1.0;

/// Command-line arguments for the gptchat tool.
///
/// Floating point options are taken as text and validated when converted
/// into a [`ChatConfig`].
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "OpenAI model to use (default: gpt-4.5-preview)", "MODEL")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[arrrg(optional, "Sampling temperature, 0 to 2 (default: 1.0)", "TEMP")]
    pub temperature: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Maximum tokens in response (default: 2048)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling parameter.
    #[arrrg(optional, "Nucleus sampling parameter, 0 to 1 (default: 1.0)", "P")]
    pub top_p: Option<String>,

    /// System prompt that opens the conversation.
    #[arrrg(optional, "System prompt (default: You are a helpful assistant.)", "PROMPT")]
    pub system: Option<String>,

    /// Alternate API base URL.
    #[arrrg(optional, "API base URL (default: https://api.openai.com/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Request timeout.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Typing effect delay.
    #[arrrg(optional, "Delay between rendered characters (default: 20)", "MS")]
    pub char_delay_ms: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Log requests and responses to stderr.
    #[arrrg(flag, "Log API requests and responses to stderr")]
    pub verbose: bool,
}

/// Error converting [`ChatArgs`] into a [`ChatConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChatArgsError {
    /// The value is not a number.
    InvalidNumber {
        /// The option name, e.g. `--temperature`.
        option: &'static str,
        /// The offending value as given.
        value: String,
    },

    /// The value is a number outside the accepted range.
    OutOfRange {
        /// The option name, e.g. `--top-p`.
        option: &'static str,
        /// The offending value.
        value: f64,
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
    },
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::InvalidNumber { option, value } => {
                write!(f, "{option} expects a number, got {value:?}")
            }
            ChatArgsError::OutOfRange {
                option,
                value,
                min,
                max,
            } => write!(f, "{option} must be between {min} and {max}, got {value}"),
        }
    }
}

impl std::error::Error for ChatArgsError {}

/// The parameters that control generation.
///
/// Sent verbatim with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum tokens per response.
    pub max_tokens: u32,

    /// Nucleus sampling value.
    pub top_p: f32,
}

impl SamplingConfig {
    /// Creates a sampling configuration from explicit values.
    pub fn new(model: impl Into<Model>, temperature: f32, max_tokens: u32, top_p: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
            top_p,
        }
    }

    /// Builds the request for the given transcript.
    pub fn request(&self, messages: &[Message]) -> ChatCompletionCreateParams {
        ChatCompletionCreateParams::new(
            self.model.clone(),
            messages.to_vec(),
            self.temperature,
            self.max_tokens,
            self.top_p,
        )
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            model: Model::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
        }
    }
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Model and sampling parameters.
    pub sampling: SamplingConfig,

    /// System message that opens the conversation.
    pub system_prompt: String,

    /// Alternate API base URL.
    pub base_url: Option<String>,

    /// Request timeout; `None` leaves it to the transport.
    pub timeout: Option<Duration>,

    /// Pause between rendered characters.
    pub char_delay: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log API traffic to stderr.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gpt-4.5-preview
    /// - Temperature: 1.0
    /// - Max tokens: 2048
    /// - Top-p: 1.0
    /// - System prompt: "You are a helpful assistant."
    /// - Character delay: 20ms
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            base_url: None,
            timeout: None,
            char_delay: DEFAULT_CHAR_DELAY,
            use_color: true,
            verbose: false,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<Model>) -> Self {
        self.sampling.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.sampling.temperature = temperature;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.sampling.max_tokens = max_tokens;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.sampling.top_p = top_p;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the pause between rendered characters.
    pub fn with_char_delay(mut self, char_delay: Duration) -> Self {
        self.char_delay = char_delay;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The model in use.
    pub fn model(&self) -> &Model {
        &self.sampling.model
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let defaults = ChatConfig::new();
        let model = args
            .model
            .map(Model::from)
            .unwrap_or(defaults.sampling.model);
        let temperature = parse_f32_in_range(
            "--temperature",
            args.temperature.as_deref(),
            DEFAULT_TEMPERATURE,
            0.0,
            2.0,
        )?;
        let top_p = parse_f32_in_range("--top-p", args.top_p.as_deref(), DEFAULT_TOP_P, 0.0, 1.0)?;
        let max_tokens = args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ChatArgsError::OutOfRange {
                option: "--max-tokens",
                value: 0.0,
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }

        Ok(ChatConfig {
            sampling: SamplingConfig::new(model, temperature, max_tokens, top_p),
            system_prompt: args.system.unwrap_or(defaults.system_prompt),
            base_url: args.base_url,
            timeout: args.timeout_secs.map(Duration::from_secs),
            char_delay: args
                .char_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.char_delay),
            use_color: !args.no_color,
            verbose: args.verbose,
        })
    }
}

fn parse_f32_in_range(
    option: &'static str,
    value: Option<&str>,
    default: f32,
    min: f32,
    max: f32,
) -> Result<f32, ChatArgsError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let parsed = value
        .trim()
        .parse::<f32>()
        .map_err(|_| ChatArgsError::InvalidNumber {
            option,
            value: value.to_string(),
        })?;
    if parsed.is_nan() || !(min..=max).contains(&parsed) {
        return Err(ChatArgsError::OutOfRange {
            option,
            value: f64::from(parsed),
            min: f64::from(min),
            max: f64::from(max),
        });
    }
    Ok(parsed)
}

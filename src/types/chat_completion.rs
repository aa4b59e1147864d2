use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Message, Model, Role, Usage};

/// Body of a `POST /chat/completions` request.
///
/// The sampling parameters are passed through exactly as configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionCreateParams {
    /// The model that will complete the conversation.
    pub model: Model,

    /// The full ordered transcript, system message first.
    pub messages: Vec<Message>,

    /// Amount of randomness injected into the response.
    pub temperature: f32,

    /// The maximum number of tokens to generate before stopping.
    pub max_tokens: u32,

    /// Use nucleus sampling.
    pub top_p: f32,
}

impl ChatCompletionCreateParams {
    /// Create request parameters for the given transcript.
    pub fn new(
        model: impl Into<Model>,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
        top_p: f32,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
            max_tokens,
            top_p,
        }
    }
}

/// A chat completion returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Unique identifier for the completion.
    #[serde(default)]
    pub id: String,

    /// The model that produced the completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Candidate replies; the first one is the one gptchat uses.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token accounting for the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One candidate reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this choice in the response.
    #[serde(default)]
    pub index: u32,

    /// The generated message.
    pub message: ChoiceMessage,

    /// Why generation stopped, e.g. `stop` or `length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The message inside a [`Choice`].
///
/// Unlike [`Message`], the content may be absent (refusals, tool calls).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceMessage {
    /// Author role; always `assistant` in practice.
    pub role: Role,

    /// Generated text.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Build a completion holding a single assistant reply.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            model: None,
            choices: vec![Choice {
                index: 0,
                message: ChoiceMessage {
                    role: Role::Assistant,
                    content: Some(text.into()),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        }
    }

    /// Attach usage information.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Returns the text of the top choice.
    ///
    /// # Errors
    ///
    /// A completion without choices, or whose top choice has no text content,
    /// is treated as a malformed response.
    pub fn text(&self) -> Result<&str> {
        let choice = self.choices.first().ok_or_else(|| {
            Error::serialization("malformed response: no choices returned", None)
        })?;
        choice.message.content.as_deref().ok_or_else(|| {
            Error::serialization("malformed response: top choice has no content", None)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;
    use serde_json::{json, to_value};

    #[test]
    fn request_serializes_parameters_verbatim() {
        let params = ChatCompletionCreateParams::new(
            KnownModel::Gpt4,
            vec![
                Message::system("You are a helpful assistant."),
                Message::user("Hello, world!"),
            ],
            0.7,
            2048,
            0.9,
        );
        let value = to_value(&params).unwrap();
        assert_eq!(value["model"], json!("gpt-4"));
        assert_eq!(value["max_tokens"], json!(2048));
        assert_eq!(
            value["messages"],
            json!([
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "Hello, world!"}
            ])
        );
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((value["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn completion_deserializes_api_response() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-4-0613",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there!"},
                "logprobs": null,
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        }))
        .unwrap();
        assert_eq!(completion.id, "chatcmpl-123");
        assert_eq!(completion.text().unwrap(), "Hello there!");
        assert_eq!(completion.usage, Some(Usage::new(9, 3)));
    }

    #[test]
    fn empty_choices_is_malformed() {
        let completion: ChatCompletion =
            serde_json::from_value(json!({"id": "x", "choices": []})).unwrap();
        let err = completion.text().unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn null_content_is_malformed() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "x",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(completion.text().is_err());
    }

    #[test]
    fn from_text_has_one_choice() {
        let completion = ChatCompletion::from_text("fake").with_usage(Usage::new(1, 1));
        assert_eq!(completion.choices.len(), 1);
        assert_eq!(completion.text().unwrap(), "fake");
    }
}

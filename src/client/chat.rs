use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

use super::core::ChatClient;

/// OpenAI-compatible chat-completions request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Chat-completions response.
///
/// Choices are kept as raw JSON so the proxy endpoint can hand them to the
/// browser untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

impl ChatCompletion {
    /// Text of the first choice's message.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()?
            .get("message")?
            .get("content")?
            .as_str()
    }
}

/// Builder for chat requests.
pub struct ChatRequestBuilder<'a> {
    pub(crate) client: &'a ChatClient,
    pub(crate) model: Option<String>,
    pub(crate) messages: Vec<Message>,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_tokens: Option<u32>,
}

impl<'a> ChatRequestBuilder<'a> {
    pub(crate) fn new(client: &'a ChatClient) -> Self {
        Self {
            client,
            model: None,
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Override the client's default model for this request.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::system(text));
        self
    }

    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::user(text));
        self
    }

    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn build(self) -> ChatRequest {
        ChatRequest {
            model: self
                .model
                .unwrap_or_else(|| self.client.model().to_string()),
            messages: self.messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Sends the request and returns the full completion.
    pub async fn send(self) -> Result<ChatCompletion> {
        if self.messages.is_empty() {
            return Err(Error::validation_with_context(
                "messages must not be empty",
                ErrorContext::new()
                    .with_field_path("messages")
                    .with_source("chat_client"),
            ));
        }
        let client = self.client;
        client.complete(&self.build()).await
    }

    /// Sends the request and returns the first choice's text.
    pub async fn execute(self) -> Result<String> {
        let completion = self.send().await?;
        completion
            .first_content()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::runtime_with_context(
                    "completion contained no message content",
                    ErrorContext::new()
                        .with_field_path("choices[0].message.content")
                        .with_source("chat_client"),
                )
            })
    }
}

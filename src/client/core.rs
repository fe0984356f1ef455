use crate::config::UpstreamConfig;
use crate::transport::HttpTransport;
use crate::Result;
use tracing::debug;

use super::chat::{ChatCompletion, ChatRequest, ChatRequestBuilder};

const COMPLETIONS_PATH: &str = "/chat/completions";

/// Client for an OpenAI-compatible chat-completions API (OpenRouter by default).
pub struct ChatClient {
    transport: HttpTransport,
    model: String,
}

impl ChatClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
            model: config.model.clone(),
        })
    }

    /// Default model used when a request does not name one.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.transport.has_api_key()
    }

    /// Start a chat request.
    pub fn chat(&self) -> ChatRequestBuilder<'_> {
        ChatRequestBuilder::new(self)
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        debug!(
            model = request.model.as_str(),
            messages = request.messages.len(),
            "sending chat completion"
        );
        self.forward(&serde_json::to_value(request)?).await
    }

    /// Posts an already-assembled request body, for callers that relay
    /// messages this crate does not model.
    pub async fn forward(&self, body: &serde_json::Value) -> Result<ChatCompletion> {
        let json = self.transport.post_json(COMPLETIONS_PATH, body).await?;
        Ok(serde_json::from_value(json)?)
    }
}

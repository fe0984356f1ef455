use crate::config::UpstreamConfig;
use crate::{Error, ErrorContext, Result};
use reqwest::Proxy;
use std::time::{Duration, Instant};
use tracing::info;

/// JSON-over-HTTP transport to the chat-completions provider.
///
/// The request timeout configured here is the only bound on how long a
/// specialist request can wait for advice.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    "invalid outbound proxy",
                    ErrorContext::new()
                        .with_field_path("AI_PROXY_URL")
                        .with_details(e.to_string()),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `body` to `{base_url}{path}` and decodes the JSON response.
    ///
    /// Non-2xx responses become [`Error::Remote`] carrying the provider's
    /// `error.message` when present.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            info!(
                http_status = status.as_u16(),
                path,
                duration_ms = start.elapsed().as_millis() as u64,
                "upstream request failed"
            );
            return Err(Error::Remote {
                status: status.as_u16(),
                message: remote_message(&text)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("upstream error").to_string()),
            });
        }

        let json = response.json().await?;
        info!(
            http_status = status.as_u16(),
            path,
            duration_ms = start.elapsed().as_millis() as u64,
            "upstream request completed"
        );
        Ok(json)
    }
}

/// Extracts the OpenAI-style `error.message` (or a bare string body).
fn remote_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => json
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
        Err(_) => Some(trimmed.to_string()),
    }
}

//! Environment-driven server configuration.

use crate::cache::PolicyConfig;
use crate::{Error, ErrorContext, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324";

/// Settings for the outbound chat-completions client.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub proxy_url: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
            proxy_url: None,
        }
    }
}

impl UpstreamConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Tell browsers to go through `/api/query` instead of handing out the key.
    pub use_ai_proxy: bool,
    pub cache_enabled: bool,
    pub policy: PolicyConfig,
    pub upstream: UpstreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
            use_ai_proxy: false,
            cache_enabled: true,
            policy: PolicyConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset variables. Set-but-malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let upstream = UpstreamConfig {
            base_url: get("OPENROUTER_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream.base_url),
            api_key: get("OPENROUTER_API_KEY"),
            model: get("AI_MODEL").unwrap_or(defaults.upstream.model),
            timeout: Duration::from_secs(
                parse_var(&get, "AI_HTTP_TIMEOUT_SECS")?.unwrap_or(30u64).max(1),
            ),
            pool_max_idle_per_host: parse_var(&get, "AI_HTTP_POOL_MAX_IDLE_PER_HOST")?
                .unwrap_or(defaults.upstream.pool_max_idle_per_host),
            proxy_url: get("AI_PROXY_URL"),
        };

        let policy = PolicyConfig {
            fresh_weeks: parse_var(&get, "ADVICE_CACHE_FRESH_WEEKS")?
                .unwrap_or(defaults.policy.fresh_weeks),
            weight_tolerance_kg: parse_var(&get, "ADVICE_CACHE_WEIGHT_TOLERANCE_KG")?
                .unwrap_or(defaults.policy.weight_tolerance_kg),
        };

        Ok(Self {
            host: get("BIND_HOST").unwrap_or(defaults.host),
            port: parse_var(&get, "PORT")?.unwrap_or(defaults.port),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            use_ai_proxy: get("USE_AI_PROXY").is_some_and(|v| v == "true"),
            cache_enabled: parse_bool(&get, "ADVICE_CACHE_ENABLED")?
                .unwrap_or(defaults.cache_enabled),
            policy,
            upstream,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }
    pub fn with_ai_proxy(mut self, enabled: bool) -> Self {
        self.use_ai_proxy = enabled;
        self
    }
    pub fn with_upstream(mut self, upstream: UpstreamConfig) -> Self {
        self.upstream = upstream;
        self
    }
}

fn parse_var<T, G>(get: &G, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid value for {}", name),
                ErrorContext::new()
                    .with_field_path(name)
                    .with_details(format!("'{}': {}", raw, e))
                    .with_source("server_config"),
            )
        }),
    }
}

fn parse_bool<G>(get: &G, name: &str) -> Result<Option<bool>>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(Some(true)),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(Some(false)),
        Some(v) => Err(Error::configuration_with_context(
            format!("invalid value for {}", name),
            ErrorContext::new()
                .with_field_path(name)
                .with_details(format!("expected a boolean, got '{}'", v))
                .with_source("server_config"),
        )),
    }
}

//! advice-server: HTTP backend for the specialist advice endpoints.
//!
//! Configuration comes from environment variables (`PORT`, `OPENROUTER_API_KEY`,
//! `ADVICE_CACHE_ENABLED`, ...). Log verbosity follows `RUST_LOG`, default `info`.

use anyhow::Context;
use specialist_advice::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    if config.upstream.api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; specialists will return fallback advice");
    }

    specialist_advice::server::serve(config)
        .await
        .context("advice server stopped")
}

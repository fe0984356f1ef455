//! HTTP surface: specialist endpoints behind the caching pipeline, cache
//! stats, the raw completions proxy, one-off analysis endpoints and static
//! files.

mod handlers;
mod identity;

pub use identity::ClientIdentity;

use crate::advisor::{AdviceGenerator, OpenRouterAdvisor};
use crate::cache::{
    CacheStore, CachingPipeline, InvalidationPolicy, MemoryStore, NullStore, StatsReporter,
};
use crate::client::ChatClient;
use crate::config::ServerConfig;
use crate::{Error, ErrorContext, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

/// Shared state handed to every handler.
pub struct AppState {
    pub config: ServerConfig,
    pub pipeline: CachingPipeline,
    pub stats: StatsReporter,
    pub advisor: Arc<dyn AdviceGenerator>,
    pub chat: Arc<ChatClient>,
}

impl AppState {
    /// Wires the store, pipeline and upstream client from configuration.
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let chat = Arc::new(ChatClient::new(&config.upstream)?);
        let advisor: Arc<dyn AdviceGenerator> = Arc::new(OpenRouterAdvisor::new(chat.clone()));
        Ok(Self::with_advisor(config, chat, advisor))
    }

    /// Like [`AppState::from_config`] but with an explicit advice generator.
    pub fn with_advisor(
        config: ServerConfig,
        chat: Arc<ChatClient>,
        advisor: Arc<dyn AdviceGenerator>,
    ) -> Self {
        let store: Arc<dyn CacheStore> = if config.cache_enabled {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(NullStore::new())
        };
        let pipeline = CachingPipeline::new(store.clone())
            .with_policy(InvalidationPolicy::new(config.policy.clone()));
        Self {
            stats: StatsReporter::new(store),
            pipeline,
            advisor,
            chat,
            config,
        }
    }
}

/// `{success: false, error}` response with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    Router::new()
        .route("/health", get(handlers::health))
        .route("/test", get(handlers::test))
        .route("/api/get-ai-key", get(handlers::get_ai_key))
        .route("/api/query", post(handlers::query))
        .route("/api/analyze-workout", post(handlers::analyze_workout))
        .route("/api/analyze-nutrition", post(handlers::analyze_nutrition))
        .route("/api/calibrate-energy", post(handlers::calibrate_energy))
        .route("/api/daily-tips", post(handlers::daily_tips))
        .route("/api/check/:user_id", get(handlers::check_user))
        .route(
            "/api/activation/status/:user_id",
            get(handlers::activation_status),
        )
        .route("/api/trainer", post(handlers::trainer))
        .route("/api/diet", post(handlers::diet))
        .route("/api/energy", post(handlers::energy))
        .route("/api/cache-stats", get(handlers::cache_stats))
        .route("/api/cache-metrics", get(handlers::cache_metrics))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves `router` on `listener` until the process is stopped.
pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| {
        Error::runtime_with_context(
            "server error",
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("http_server"),
        )
    })
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.bind_addr();
    let state = Arc::new(AppState::from_config(config)?);
    let listener = TcpListener::bind(addr.as_str()).await?;
    info!(
        addr = addr.as_str(),
        cache_backend = state.pipeline.store().name(),
        ai_configured = state.chat.has_api_key(),
        "advice server listening"
    );
    serve_on(listener, state).await
}

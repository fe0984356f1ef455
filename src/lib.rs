//! # specialist-advice
//!
//! Backend for a fitness course: forwards client profiles to an LLM provider
//! and returns advice from three specialists (trainer, diet, energy coach),
//! reusing earlier advice through an adaptive per-client cache.
//!
//! ## Overview
//!
//! Every specialist request carries the client's physiological profile. The
//! [`cache`] module keys the request by client identity and a digest of that
//! profile, and serves the stored reply while it is recent or while the
//! client's weight has barely changed. Everything else goes to the
//! [`advisor`], whose output is captured for next time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use specialist_advice::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> specialist_advice::Result<()> {
//!     let config = ServerConfig::from_env()?.with_port(8080);
//!     specialist_advice::server::serve(config).await
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Key derivation, store, invalidation policy, pipeline, stats |
//! | [`advisor`] | Advice generation and one-off analysis prompts |
//! | [`client`] | Chat-completions client and request builder |
//! | [`transport`] | HTTP transport to the provider |
//! | [`server`] | axum routes and handlers |
//! | [`config`] | Environment-driven configuration |
//! | [`types`] | Profiles, replies, messages, specialists |

pub mod advisor;
pub mod cache;
pub mod client;
pub mod config;
pub mod server;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use advisor::{AdviceGenerator, OpenRouterAdvisor};
pub use cache::{CachingPipeline, InvalidationPolicy, MemoryStore, ProfileKeyBuilder};
pub use client::ChatClient;
pub use config::ServerConfig;
pub use types::{ClientProfile, Message, MessageRole, Specialist, SpecialistReply};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};

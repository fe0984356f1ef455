//! # Adaptive Advice Cache
//!
//! Decides, per client and specialist, whether a previously generated reply
//! may be served again or must be regenerated.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ProfileKeyBuilder`] | Composite key from client identity, agent and profile digest |
//! | [`CacheStore`] | Trait for cache backends |
//! | [`MemoryStore`] | Unbounded in-memory backend |
//! | [`NullStore`] | No-op backend for disabling caching |
//! | [`InvalidationPolicy`] | HIT / STALE / MISS decision |
//! | [`CachingPipeline`] | Wraps specialist handlers, serves or captures replies |
//! | [`StatsReporter`] | Per-specialist and per-client counts |
//!
//! ## Invalidation
//!
//! A stored reply is served when it is younger than three weeks, or when the
//! client's weight differs from the weight it was generated for by less than
//! 2 kg. Otherwise it is regenerated and overwritten. Requests without a
//! numeric weight are never served from, nor written to, the cache.
//!
//! ## Example
//!
//! ```rust
//! use specialist_advice::cache::{CachingPipeline, MemoryStore, RequestContext};
//! use specialist_advice::types::{ClientProfile, Specialist, SpecialistReply};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let pipeline = CachingPipeline::new(Arc::new(MemoryStore::new()));
//! let profile: ClientProfile = serde_json::from_value(serde_json::json!({"weight": 80})).unwrap();
//! let ctx = RequestContext::new("10.0.0.1", "curl/8.0", "/api/trainer", profile);
//!
//! let first = pipeline
//!     .handle(&ctx, || async { SpecialistReply::advice(Specialist::Trainer, "squats") })
//!     .await;
//! assert_eq!(first.cached, Some(false));
//!
//! let second = pipeline
//!     .handle(&ctx, || async { SpecialistReply::advice(Specialist::Trainer, "lunges") })
//!     .await;
//! assert_eq!(second.cached, Some(true));
//! assert_eq!(second.advice.as_deref(), Some("squats"));
//! # });
//! ```
//!
//! The in-memory store has no eviction: its size grows with the number of
//! distinct keys for the lifetime of the process.

mod key;
mod pipeline;
mod policy;
mod stats;
mod store;

pub use key::{CacheKey, KeyConfig, ProfileKeyBuilder};
pub use pipeline::{CachingPipeline, PipelineStats, RequestContext};
pub use policy::{Decision, HitReason, InvalidationPolicy, PolicyConfig};
pub use stats::{CacheSnapshot, SpecialistCounts, StatsReporter};
pub use store::{CacheEntry, CacheStore, MemoryStore, NullStore};

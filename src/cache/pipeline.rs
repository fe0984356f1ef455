//! Caching pipeline wrapped around specialist handlers.

use super::key::{CacheKey, ProfileKeyBuilder};
use super::policy::{Decision, HitReason, InvalidationPolicy};
use super::store::{CacheEntry, CacheStore};
use crate::types::{ClientProfile, SpecialistReply};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything the pipeline needs to know about one specialist request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Network identity of the client (forwarded-for address or peer IP).
    pub identity: String,
    /// Client agent string; empty when absent.
    pub agent: String,
    /// Route of the specialist endpoint, e.g. `/api/trainer`.
    pub path: String,
    pub profile: ClientProfile,
}

impl RequestContext {
    pub fn new(
        identity: impl Into<String>,
        agent: impl Into<String>,
        path: impl Into<String>,
        profile: ClientProfile,
    ) -> Self {
        Self {
            identity: identity.into(),
            agent: agent.into(),
            path: path.into(),
            profile,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub writes: u64,
    pub errors: u64,
}

impl PipelineStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses + self.stale;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    stale: AtomicU64,
    writes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> PipelineStats {
        PipelineStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Serves cached specialist replies or generates and captures fresh ones.
///
/// The pipeline never fails: store errors degrade to a miss (on lookup) or a
/// skipped write (on capture), and the handler's own result is returned.
/// Two concurrent regenerations of the same key both write; the later write
/// wins, which is fine since both are fresh.
#[derive(Clone)]
pub struct CachingPipeline {
    store: Arc<dyn CacheStore>,
    keys: ProfileKeyBuilder,
    policy: InvalidationPolicy,
    stats: Arc<AtomicStats>,
}

impl CachingPipeline {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            keys: ProfileKeyBuilder::default(),
            policy: InvalidationPolicy::default(),
            stats: Arc::new(AtomicStats::default()),
        }
    }

    pub fn with_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_key_builder(mut self, keys: ProfileKeyBuilder) -> Self {
        self.keys = keys;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats.to_stats()
    }

    pub fn key_for(&self, ctx: &RequestContext) -> CacheKey {
        self.keys
            .build_key(&ctx.identity, &ctx.agent, &ctx.profile, &ctx.path)
    }

    /// Runs `handler` unless a cached reply may be served for `ctx`.
    pub async fn handle<F, Fut>(&self, ctx: &RequestContext, handler: F) -> SpecialistReply
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SpecialistReply>,
    {
        let key = self.key_for(ctx);
        let current_weight = ctx.profile.weight_kg();
        let now = Utc::now();

        let stored = match self.store.get(&key).await {
            Ok(stored) => stored,
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(path = %ctx.path, error = %e, "cache lookup failed, treating as miss");
                None
            }
        };

        let decision = self.policy.decide(stored.as_ref(), current_weight, now);
        debug!(key = %key, decision = decision.label(), "cache decision");
        match (decision, stored) {
            (Decision::Hit(reason), Some(entry)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                info!(path = %ctx.path, ?reason, "serving cached advice");
                return annotate_hit(entry.response, reason);
            }
            (Decision::Stale { weeks_elapsed, weight_delta }, _) => {
                self.stats.stale.fetch_add(1, Ordering::Relaxed);
                info!(
                    path = %ctx.path,
                    weeks_elapsed,
                    weight_delta,
                    "cached advice is stale, regenerating"
                );
            }
            _ => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                info!(path = %ctx.path, "no cached advice, generating");
            }
        }

        let reply = handler().await;
        self.capture(&key, reply, current_weight, now).await
    }

    async fn capture(
        &self,
        key: &CacheKey,
        reply: SpecialistReply,
        current_weight: Option<f64>,
        now: DateTime<Utc>,
    ) -> SpecialistReply {
        let Some(weight) = current_weight else {
            return reply;
        };
        if !reply.success || !reply.has_advice() {
            return reply;
        }

        let mut fresh = reply;
        fresh.cached = Some(false);
        fresh.weeks_since_cache = None;
        fresh.weight_difference = None;
        fresh.generated_at = Some(now.to_rfc3339_opts(SecondsFormat::Millis, true));

        match self
            .store
            .set(key, CacheEntry::new(fresh.clone(), weight, now))
            .await
        {
            Ok(()) => {
                self.stats.writes.fetch_add(1, Ordering::Relaxed);
                info!(path = %key.path, weight, "cached fresh advice");
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(path = %key.path, error = %e, "failed to cache advice");
            }
        }
        fresh
    }
}

fn annotate_hit(mut reply: SpecialistReply, reason: HitReason) -> SpecialistReply {
    reply.cached = Some(true);
    reply.weeks_since_cache = None;
    reply.weight_difference = None;
    match reason {
        HitReason::Recent { weeks_elapsed } => {
            reply.weeks_since_cache = Some(format!("{:.1}", weeks_elapsed));
        }
        HitReason::WeightStable { weight_delta } => {
            reply.weight_difference = Some(weight_delta);
        }
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::{FailingStore, MemoryStore, NullStore};
    use crate::types::Specialist;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn ctx(weight: serde_json::Value) -> RequestContext {
        let profile = serde_json::from_value(json!({
            "name": "A", "age": 30, "weight": weight, "height": 180,
            "goal": "lose", "activity": "high"
        }))
        .unwrap();
        RequestContext::new("10.0.0.1", "test-agent", "/api/trainer", profile)
    }

    #[tokio::test]
    async fn test_second_call_hits() {
        let pipeline = CachingPipeline::new(Arc::new(MemoryStore::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                SpecialistReply::advice(Specialist::Trainer, "squats")
            }
        };

        let first = pipeline.handle(&ctx(json!(80)), handler).await;
        assert_eq!(first.cached, Some(false));
        assert!(first.generated_at.is_some());

        let second = pipeline.handle(&ctx(json!(80)), handler).await;
        assert_eq!(second.cached, Some(true));
        assert_eq!(second.weeks_since_cache.as_deref(), Some("0.0"));
        assert_eq!(second.weight_difference, None);
        assert_eq!(second.advice.as_deref(), Some("squats"));
        assert_eq!(second.generated_at, first.generated_at);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = pipeline.stats();
        assert_eq!((stats.hits, stats.misses, stats.writes), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_weight_stable_hit_reports_difference() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = CachingPipeline::new(store.clone());
        let key = pipeline.key_for(&ctx(json!(81)));
        store
            .set(
                &key,
                CacheEntry::new(
                    SpecialistReply::advice(Specialist::Trainer, "old"),
                    80.0,
                    Utc::now() - Duration::days(25),
                ),
            )
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reply = pipeline
            .handle(&ctx(json!(81)), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                SpecialistReply::advice(Specialist::Trainer, "fresh")
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(reply.advice.as_deref(), Some("old"));
        assert_eq!(reply.cached, Some(true));
        assert_eq!(reply.weight_difference, Some(1.0));
        assert_eq!(reply.weeks_since_cache, None);
    }

    #[tokio::test]
    async fn test_stale_entry_is_regenerated_and_overwritten() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = CachingPipeline::new(store.clone());
        let key = pipeline.key_for(&ctx(json!(83)));
        let old_ts = Utc::now() - Duration::days(25);
        store
            .set(
                &key,
                CacheEntry::new(SpecialistReply::advice(Specialist::Trainer, "old"), 80.0, old_ts),
            )
            .await
            .unwrap();

        let reply = pipeline
            .handle(&ctx(json!(83)), || async {
                SpecialistReply::advice(Specialist::Trainer, "new")
            })
            .await;
        assert_eq!(reply.cached, Some(false));
        assert_eq!(reply.advice.as_deref(), Some("new"));

        let stored = store.get(&key).await.unwrap().unwrap();
        assert_eq!(stored.weight, 83.0);
        assert!(stored.written_at > old_ts);
        assert_eq!(stored.response.advice.as_deref(), Some("new"));
        assert_eq!(pipeline.stats().stale, 1);
    }

    #[tokio::test]
    async fn test_reply_without_advice_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = CachingPipeline::new(store.clone());
        let reply = pipeline
            .handle(&ctx(json!(80)), || async {
                SpecialistReply {
                    success: true,
                    kind: Some(Specialist::Trainer),
                    ..Default::default()
                }
            })
            .await;
        assert_eq!(reply.cached, None);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_reply_is_returned_unmodified() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = CachingPipeline::new(store.clone());
        let failure = SpecialistReply::failure(Specialist::Trainer, "missing profile");
        let expected = failure.clone();
        let reply = pipeline
            .handle(&ctx(json!(80)), move || async move { failure })
            .await;
        assert_eq!(reply, expected);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_weight_never_caches() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = CachingPipeline::new(store.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                SpecialistReply::advice(Specialist::Trainer, "advice")
            }
        };

        let first = pipeline.handle(&ctx(json!(null)), handler).await;
        let second = pipeline.handle(&ctx(json!(null)), handler).await;
        assert_eq!(first.cached, None);
        assert_eq!(second.cached, None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_null_store_always_generates() {
        let pipeline = CachingPipeline::new(Arc::new(NullStore::new()));
        for _ in 0..2 {
            let reply = pipeline
                .handle(&ctx(json!(80)), || async {
                    SpecialistReply::advice(Specialist::Trainer, "advice")
                })
                .await;
            assert_eq!(reply.cached, Some(false));
        }
        assert_eq!(pipeline.stats().hits, 0);
    }

    #[tokio::test]
    async fn test_store_failures_degrade_to_fresh_reply() {
        let pipeline = CachingPipeline::new(Arc::new(FailingStore));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reply = pipeline
            .handle(&ctx(json!(80)), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                SpecialistReply::advice(Specialist::Trainer, "x")
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(reply.cached, Some(false));
        assert_eq!(reply.advice.as_deref(), Some("x"));
        assert!(reply.generated_at.is_some());

        let stats = pipeline.stats();
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 0);
    }

    #[test]
    fn test_hit_ratio() {
        let stats = PipelineStats {
            hits: 3,
            misses: 1,
            stale: 0,
            writes: 1,
            errors: 0,
        };
        assert_eq!(stats.hit_ratio(), 0.75);
        assert_eq!(PipelineStats::default().hit_ratio(), 0.0);
    }
}

//! Read-only aggregation over the cache store.

use super::store::CacheStore;
use crate::types::Specialist;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistCounts {
    pub trainer: usize,
    pub diet: usize,
    pub energy: usize,
}

impl SpecialistCounts {
    fn bump(&mut self, specialist: Specialist) {
        match specialist {
            Specialist::Trainer => self.trainer += 1,
            Specialist::Diet => self.diet += 1,
            Specialist::Energy => self.energy += 1,
        }
    }
}

/// Body of the cache stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub total_cached: usize,
    pub unique_users: usize,
    pub by_specialist: SpecialistCounts,
}

pub struct StatsReporter {
    store: Arc<dyn CacheStore>,
}

impl StatsReporter {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Counts cached entries per specialist and distinct client identities.
    ///
    /// Keys whose path does not name a known specialist count towards the
    /// total only. A store failure yields an empty snapshot.
    pub async fn snapshot(&self) -> CacheSnapshot {
        let entries = match self.store.entries().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "cache stats unavailable");
                return CacheSnapshot::default();
            }
        };

        let mut snapshot = CacheSnapshot {
            total_cached: entries.len(),
            ..Default::default()
        };
        let mut clients = HashSet::new();
        for (key, _) in &entries {
            if let Some(specialist) = key.specialist() {
                snapshot.by_specialist.bump(specialist);
            }
            clients.insert(key.client_identity().to_string());
        }
        snapshot.unique_users = clients.len();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::CacheKey;
    use crate::cache::store::{CacheEntry, FailingStore, MemoryStore};
    use crate::types::SpecialistReply;
    use chrono::Utc;

    async fn put(store: &MemoryStore, client: &str, path: &str) {
        store
            .set(
                &CacheKey::new(client, path),
                CacheEntry::new(
                    SpecialistReply::advice(Specialist::Trainer, "x"),
                    80.0,
                    Utc::now(),
                ),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_snapshot() {
        let reporter = StatsReporter::new(Arc::new(MemoryStore::new()));
        assert_eq!(reporter.snapshot().await, CacheSnapshot::default());
    }

    #[tokio::test]
    async fn test_store_failure_yields_empty_snapshot() {
        let reporter = StatsReporter::new(Arc::new(FailingStore));
        assert_eq!(reporter.snapshot().await, CacheSnapshot::default());
    }

    #[tokio::test]
    async fn test_counts_by_specialist_and_client() {
        let store = Arc::new(MemoryStore::new());
        put(&store, "10.0.0.1_ua_aaaaaaaaaaaa", "/api/trainer").await;
        put(&store, "10.0.0.1_ua_aaaaaaaaaaaa", "/api/diet").await;
        put(&store, "10.0.0.1_ua_bbbbbbbbbbbb", "/api/diet").await;
        put(&store, "10.0.0.2_other_cccccccccccc", "/api/energy").await;
        put(&store, "10.0.0.3_ua_dddddddddddd", "/api/unknown").await;

        let snapshot = StatsReporter::new(store).snapshot().await;
        assert_eq!(snapshot.total_cached, 5);
        assert_eq!(snapshot.unique_users, 3);
        assert_eq!(
            snapshot.by_specialist,
            SpecialistCounts {
                trainer: 1,
                diet: 2,
                energy: 1
            }
        );
    }

    #[test]
    fn test_wire_format() {
        let snapshot = CacheSnapshot {
            total_cached: 2,
            unique_users: 1,
            by_specialist: SpecialistCounts {
                trainer: 1,
                diet: 1,
                energy: 0,
            },
        };
        assert_eq!(
            serde_json::to_value(snapshot).unwrap(),
            serde_json::json!({
                "totalCached": 2,
                "uniqueUsers": 1,
                "bySpecialist": {"trainer": 1, "diet": 1, "energy": 0}
            })
        );
    }
}

//! Cache store implementations.

use super::key::CacheKey;
use crate::types::SpecialistReply;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A previously generated reply together with the weight and time it was
/// generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub response: SpecialistReply,
    pub weight: f64,
    pub written_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(response: SpecialistReply, weight: f64, written_at: DateTime<Utc>) -> Self {
        Self {
            response,
            weight,
            written_at,
        }
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;
    /// Inserts or overwrites the entry for `key`.
    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<()>;
    async fn entries(&self) -> Result<Vec<(CacheKey, CacheEntry)>>;
    async fn len(&self) -> Result<usize>;
    fn name(&self) -> &'static str;
}

/// Unbounded in-memory store.
///
/// Entries are never evicted: memory grows with the number of distinct
/// (client, profile, specialist) keys seen during the process lifetime.
#[derive(Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> Error {
    Error::runtime_with_context(
        "cache store lock poisoned",
        ErrorContext::new().with_source("memory_store"),
    )
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }
    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.clone(), entry);
        Ok(())
    }
    async fn entries(&self) -> Result<Vec<(CacheKey, CacheEntry)>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .iter()
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect())
    }
    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(|_| poisoned())?.len())
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Store that keeps nothing; every lookup misses.
pub struct NullStore;
impl NullStore {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _: &CacheKey) -> Result<Option<CacheEntry>> {
        Ok(None)
    }
    async fn set(&self, _: &CacheKey, _: CacheEntry) -> Result<()> {
        Ok(())
    }
    async fn entries(&self) -> Result<Vec<(CacheKey, CacheEntry)>> {
        Ok(Vec::new())
    }
    async fn len(&self) -> Result<usize> {
        Ok(0)
    }
    fn name(&self) -> &'static str {
        "null"
    }
}

/// Store whose every operation fails, for exercising degraded paths.
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl FailingStore {
    fn unavailable(op: &str) -> Error {
        Error::runtime_with_context(
            "store unavailable",
            ErrorContext::new()
                .with_details(op.to_string())
                .with_source("failing_store"),
        )
    }
}

#[cfg(test)]
#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _: &CacheKey) -> Result<Option<CacheEntry>> {
        Err(Self::unavailable("get"))
    }
    async fn set(&self, _: &CacheKey, _: CacheEntry) -> Result<()> {
        Err(Self::unavailable("set"))
    }
    async fn entries(&self) -> Result<Vec<(CacheKey, CacheEntry)>> {
        Err(Self::unavailable("entries"))
    }
    async fn len(&self) -> Result<usize> {
        Err(Self::unavailable("len"))
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

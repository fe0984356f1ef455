//! Invalidation policy for cached specialist replies.
//!
//! A cached reply is served when it is recent enough OR the client's weight
//! has barely moved since it was generated. Only when both thresholds are
//! exceeded is the reply regenerated, so a fast weight change goes unnoticed
//! until the freshness window has passed.

use super::store::CacheEntry;
use chrono::{DateTime, Utc};

const MILLIS_PER_WEEK: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    /// Entries younger than this many weeks are always served.
    pub fresh_weeks: f64,
    /// Entries whose weight differs by less than this are always served.
    pub weight_tolerance_kg: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            fresh_weeks: 3.0,
            weight_tolerance_kg: 2.0,
        }
    }
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_fresh_weeks(mut self, weeks: f64) -> Self {
        self.fresh_weeks = weeks;
        self
    }
    pub fn with_weight_tolerance_kg(mut self, kg: f64) -> Self {
        self.weight_tolerance_kg = kg;
        self
    }
}

/// Why a cached reply may be served.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitReason {
    Recent { weeks_elapsed: f64 },
    WeightStable { weight_delta: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Hit(HitReason),
    Stale { weeks_elapsed: f64, weight_delta: f64 },
    Miss,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Hit(_) => "hit",
            Decision::Stale { .. } => "stale",
            Decision::Miss => "miss",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvalidationPolicy {
    config: PolicyConfig,
}

impl InvalidationPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn decide(
        &self,
        entry: Option<&CacheEntry>,
        current_weight: Option<f64>,
        now: DateTime<Utc>,
    ) -> Decision {
        let (Some(entry), Some(current)) = (entry, current_weight) else {
            return Decision::Miss;
        };
        if !current.is_finite() || !entry.weight.is_finite() {
            return Decision::Miss;
        }

        let weeks_elapsed =
            (now - entry.written_at).num_milliseconds() as f64 / MILLIS_PER_WEEK;
        if weeks_elapsed < self.config.fresh_weeks {
            return Decision::Hit(HitReason::Recent { weeks_elapsed });
        }

        let weight_delta = (current - entry.weight).abs();
        if weight_delta < self.config.weight_tolerance_kg {
            return Decision::Hit(HitReason::WeightStable { weight_delta });
        }

        Decision::Stale {
            weeks_elapsed,
            weight_delta,
        }
    }
}

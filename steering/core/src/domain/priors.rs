// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Bayesian prior engine — per-bucket positive/negative evidence counters.
//!
//! Counters decay exponentially toward zero over elapsed time, so stale
//! evidence loses influence without ever going negative. All operations are
//! copy-on-write: they take an immutable table and return a new one, and time
//! is always an explicit parameter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::encoding::{BucketId, QueryFeatureVector};

/// Evidence counters for one feature bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorBucket {
    pub positive_count: f64,
    pub negative_count: f64,
    pub last_updated: DateTime<Utc>,
}

impl PriorBucket {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            positive_count: 0.0,
            negative_count: 0.0,
            last_updated: now,
        }
    }

    /// Laplace-smoothed directional signal in [-1, 1].
    pub fn signal(&self) -> f64 {
        let total = self.positive_count + self.negative_count;
        (self.positive_count + 1.0) / (total + 2.0) * 2.0 - 1.0
    }

    /// Total evidence mass behind this bucket.
    pub fn weight(&self) -> f64 {
        self.positive_count + self.negative_count
    }
}

/// Mapping from feature buckets to evidence counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorTable {
    buckets: BTreeMap<BucketId, PriorBucket>,
}

impl PriorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &BucketId) -> Option<&PriorBucket> {
        self.buckets.get(id)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketId, &PriorBucket)> {
        self.buckets.iter()
    }
}

/// Record one scored outcome against every bucket implicated by `vector`.
///
/// Callers gate this on `|composite_score| > outcome_threshold`; near-neutral
/// outcomes are non-informative and must be skipped to avoid prior dilution.
pub fn update_priors(
    priors: &PriorTable,
    vector: &QueryFeatureVector,
    is_positive: bool,
    now: DateTime<Utc>,
) -> PriorTable {
    let mut next = priors.clone();
    for id in vector.bucket_ids() {
        let bucket = next
            .buckets
            .entry(id)
            .or_insert_with(|| PriorBucket::new(now));
        if is_positive {
            bucket.positive_count += 1.0;
        } else {
            bucket.negative_count += 1.0;
        }
        bucket.last_updated = now;
    }
    next
}

/// Apply exponential time-decay to every bucket.
///
/// Decay is keyed on elapsed time since each bucket's `last_updated`, which
/// is then set to `now` — calling twice with an unchanged clock is a no-op on
/// the second call. Counts never go negative; buckets that decay below a
/// trace threshold are dropped to keep the table sparse.
pub fn decay_priors(priors: &PriorTable, now: DateTime<Utc>, decay_rate: f64) -> PriorTable {
    const TRACE_FLOOR: f64 = 1e-4;

    let mut next = PriorTable::new();
    for (id, bucket) in priors.iter() {
        let elapsed_days = (now - bucket.last_updated).num_seconds().max(0) as f64 / 86_400.0;
        let factor = (-decay_rate * elapsed_days).exp();
        let decayed = PriorBucket {
            positive_count: (bucket.positive_count * factor).max(0.0),
            negative_count: (bucket.negative_count * factor).max(0.0),
            last_updated: now.max(bucket.last_updated),
        };
        if decayed.weight() > TRACE_FLOOR {
            next.buckets.insert(id.clone(), decayed);
        }
    }
    next
}

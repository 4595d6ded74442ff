// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Signal encoder — turns one pipeline run into a fixed-shape synthesis key.
//!
//! The encoder is a pure function: identical floating-point inputs always
//! produce the same [`SynthesisKey`], which makes replays idempotent and lets
//! user ratings be attached to a run after the fact. Each continuous feature
//! is kept twice: as a raw `f64` (nearest-neighbor similarity in the bias
//! computer) and discretized into a small number of buckets (sparse,
//! generalizable prior table).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::signals::{QueryAnalysis, QueryDomain, SignalSnapshot, NEUTRAL_SIGNAL};

/// Number of continuous features in a [`QueryFeatureVector`].
pub const FEATURE_DIM: usize = 12;

/// Discretization granularity per feature.
pub const FEATURE_BUCKETS: u32 = 5;

/// Normalization ceilings for the open-ended topology counts.
const COMPONENT_CEILING: f64 = 16.0;
const CYCLE_CEILING: f64 = 8.0;
const MAX_PERSISTENCE_CEILING: f64 = 4.0;

/// Identifier of one discretized feature bucket, e.g. `f3b2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketId(String);

impl BucketId {
    pub fn new(feature_index: usize, bin: u32) -> Self {
        Self(format!("f{feature_index}b{bin}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-dimension numeric encoding of one (signals, query) pair.
///
/// Immutable once built. The continuous features all live in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFeatureVector {
    features: [f64; FEATURE_DIM],
}

impl QueryFeatureVector {
    /// Derive the vector from a full run snapshot.
    pub fn from_run(signals: &SignalSnapshot, analysis: &QueryAnalysis) -> Self {
        let topo = &signals.topology;
        let features = [
            unit(signals.confidence),
            unit(signals.entropy),
            unit(signals.dissonance),
            unit(signals.health_score),
            unit(signals.risk_score.min(1.0)),
            unit(topo.component_count as f64 / COMPONENT_CEILING),
            unit(topo.cycle_count as f64 / CYCLE_CEILING),
            topo.normalized_entropy(),
            unit(topo.max_persistence / MAX_PERSISTENCE_CEILING),
            unit(analysis.complexity),
            domain_feature(analysis.domain),
            cluster_feature(analysis.topic_cluster),
        ];
        Self { features }
    }

    /// Derive a pre-run vector from query analysis alone.
    ///
    /// Used for bias lookup before any signals exist for the incoming query;
    /// the signal-derived slots hold neutral midpoints, consistent with the
    /// encoder's treatment of missing telemetry.
    pub fn from_analysis(analysis: &QueryAnalysis) -> Self {
        Self::from_run(&SignalSnapshot::neutral(), analysis)
    }

    pub fn features(&self) -> &[f64; FEATURE_DIM] {
        &self.features
    }

    /// Bucket ids implicated by this vector, one per feature.
    pub fn bucket_ids(&self) -> Vec<BucketId> {
        self.features
            .iter()
            .enumerate()
            .map(|(idx, value)| BucketId::new(idx, discretize(*value)))
            .collect()
    }

    /// Plain Euclidean distance over the continuous features.
    pub fn distance(&self, other: &Self) -> f64 {
        self.features
            .iter()
            .zip(other.features.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Stable identity of one pipeline run's (query, signal) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisKey {
    /// Hex digest reproducible from the same vector + context.
    pub id: String,
    pub vector: QueryFeatureVector,
    /// Chat or session the run belongs to.
    pub context_ref: Uuid,
}

/// Encode one pipeline run into its synthesis key.
///
/// Deterministic and side-effect free: the id is a SHA-256 digest over the
/// canonical bit patterns of the feature vector and the context ref.
pub fn encode(signals: &SignalSnapshot, analysis: &QueryAnalysis, context_ref: Uuid) -> SynthesisKey {
    let vector = QueryFeatureVector::from_run(signals, analysis);
    let id = key_id(&vector, context_ref);
    SynthesisKey {
        id,
        vector,
        context_ref,
    }
}

fn key_id(vector: &QueryFeatureVector, context_ref: Uuid) -> String {
    let mut hasher = Sha256::new();
    for feature in vector.features() {
        hasher.update(feature.to_le_bytes());
    }
    hasher.update(context_ref.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn discretize(value: f64) -> u32 {
    let bin = (value * FEATURE_BUCKETS as f64) as u32;
    bin.min(FEATURE_BUCKETS - 1)
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        NEUTRAL_SIGNAL
    }
}

fn domain_feature(domain: QueryDomain) -> f64 {
    domain.ordinal() as f64 / (QueryDomain::VARIANT_COUNT - 1) as f64
}

fn cluster_feature(topic_cluster: u32) -> f64 {
    // Fold the open-ended cluster label into [0, 1) deterministically.
    (topic_cluster % 64) as f64 / 64.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signals::TopologicalSignature;

    fn sample_signals() -> SignalSnapshot {
        SignalSnapshot::new(
            0.82,
            0.31,
            0.14,
            0.77,
            0.4,
            TopologicalSignature::new(4, 1, 1.2, 0.9),
        )
    }

    fn sample_analysis() -> QueryAnalysis {
        QueryAnalysis::new(QueryDomain::Research, 0.66, 7, 42)
    }

    #[test]
    fn test_encode_is_deterministic() {
        let context = Uuid::from_u128(0xDEADBEEF);
        let a = encode(&sample_signals(), &sample_analysis(), context);
        let b = encode(&sample_signals(), &sample_analysis(), context);
        assert_eq!(a.id, b.id);
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn test_context_changes_the_id() {
        let a = encode(
            &sample_signals(),
            &sample_analysis(),
            Uuid::from_u128(1),
        );
        let b = encode(
            &sample_signals(),
            &sample_analysis(),
            Uuid::from_u128(2),
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn test_signal_change_changes_the_id() {
        let context = Uuid::from_u128(3);
        let mut other = sample_signals();
        other.confidence = 0.12;
        let a = encode(&sample_signals(), &sample_analysis(), context);
        let b = encode(&other, &sample_analysis(), context);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_bucket_ids_cover_every_feature() {
        let vector = QueryFeatureVector::from_run(&sample_signals(), &sample_analysis());
        let buckets = vector.bucket_ids();
        assert_eq!(buckets.len(), FEATURE_DIM);
        assert_eq!(buckets[0].as_str(), format!("f0b{}", discretize(0.82)));
    }

    #[test]
    fn test_discretize_clamps_to_last_bin() {
        assert_eq!(discretize(1.0), FEATURE_BUCKETS - 1);
        assert_eq!(discretize(0.0), 0);
        assert_eq!(discretize(0.99), FEATURE_BUCKETS - 1);
    }

    #[test]
    fn test_features_stay_in_unit_interval() {
        let signals = SignalSnapshot::new(
            0.9,
            0.1,
            0.2,
            0.8,
            // Alarm-range risk is clamped for the feature copy only.
            3.0,
            TopologicalSignature::new(200, 50, 10.0, 100.0),
        );
        let vector = QueryFeatureVector::from_run(&signals, &sample_analysis());
        for feature in vector.features() {
            assert!((0.0..=1.0).contains(feature), "feature {feature} escaped");
        }
    }

    #[test]
    fn test_pre_run_vector_uses_neutral_signal_slots() {
        let vector = QueryFeatureVector::from_analysis(&sample_analysis());
        assert_eq!(vector.features()[0], 0.5);
        assert_eq!(vector.features()[9], 0.66);
    }

    #[test]
    fn test_distance_is_zero_for_identical_vectors() {
        let v = QueryFeatureVector::from_run(&sample_signals(), &sample_analysis());
        assert_eq!(v.distance(&v), 0.0);
    }
}

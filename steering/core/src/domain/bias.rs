// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Bias computer — blends priors and nearest exemplars into a steering bias.
//!
//! The output is the only consumer-facing vector of the subsystem: a
//! per-feature adjustment the pipeline applies before its next run. When
//! steering is disabled or the memory is empty the bias is neutral — the
//! disabled gate is hard, no partial bias leaks through.
//!
//! Nearest-exemplar lookup uses uniform-weight Euclidean distance over the
//! continuous feature vector with inverse-distance weighting; ties in
//! distance are broken by recency (more recent exemplar wins), reflecting
//! non-stationarity of user intent over time.

use serde::{Deserialize, Serialize};

use super::config::SteeringConfig;
use super::encoding::{QueryFeatureVector, FEATURE_DIM};
use super::memory::{Exemplar, SteeringMemory};

/// Relative contribution of the coarse prior path vs the exemplar path.
const PRIOR_BLEND: f64 = 0.6;
const EXEMPLAR_BLEND: f64 = 0.4;

/// Steering adjustment consumed before the next pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteeringBias {
    /// Per-feature pull in [-1, 1]; all zeros when neutral.
    pub adjustments: [f64; FEATURE_DIM],
    /// Coarse directional signal from the prior table.
    pub prior_signal: f64,
    /// Fine-grained signal blended from the nearest exemplars.
    pub exemplar_signal: f64,
    /// Strength the adjustments were scaled by (0 when neutral).
    pub strength: f64,
}

impl SteeringBias {
    /// The identity bias: applied, it changes nothing.
    pub fn neutral() -> Self {
        Self {
            adjustments: [0.0; FEATURE_DIM],
            prior_signal: 0.0,
            exemplar_signal: 0.0,
            strength: 0.0,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.adjustments.iter().all(|a| *a == 0.0)
    }
}

/// Compute the steering bias for an incoming query.
pub fn compute_bias(
    memory: &SteeringMemory,
    query: &QueryFeatureVector,
    config: &SteeringConfig,
) -> SteeringBias {
    if !config.enabled {
        return SteeringBias::neutral();
    }
    if memory.is_empty() {
        return SteeringBias::neutral();
    }

    let strength = config.master_strength.clamp(0.0, 1.0);
    if strength == 0.0 {
        return SteeringBias::neutral();
    }

    let (prior_pull, prior_signal) = prior_path(memory, query);
    let (exemplar_pull, exemplar_signal) =
        exemplar_path(memory, query, config.neighbor_count.max(1));

    let mut adjustments = [0.0; FEATURE_DIM];
    for i in 0..FEATURE_DIM {
        let blended = PRIOR_BLEND * prior_pull[i] + EXEMPLAR_BLEND * exemplar_pull[i];
        adjustments[i] = (blended * strength).clamp(-1.0, 1.0);
    }

    SteeringBias {
        adjustments,
        prior_signal,
        exemplar_signal,
        strength,
    }
}

/// Coarse path: per-bucket Laplace signal, damped by evidence mass so a
/// single observation cannot dominate.
fn prior_path(memory: &SteeringMemory, query: &QueryFeatureVector) -> ([f64; FEATURE_DIM], f64) {
    let mut pull = [0.0; FEATURE_DIM];
    let mut total = 0.0;
    let bucket_ids = query.bucket_ids();

    for (i, id) in bucket_ids.iter().enumerate() {
        if let Some(bucket) = memory.priors.get(id) {
            let damping = bucket.weight() / (bucket.weight() + 1.0);
            pull[i] = bucket.signal() * damping;
            total += pull[i];
        }
    }

    (pull, total / FEATURE_DIM as f64)
}

/// Fine path: inverse-distance-weighted pull toward (or away from) the K
/// nearest exemplars, signed by each exemplar's effective outcome.
fn exemplar_path(
    memory: &SteeringMemory,
    query: &QueryFeatureVector,
    k: usize,
) -> ([f64; FEATURE_DIM], f64) {
    let mut ranked: Vec<(&Exemplar, f64)> = memory
        .exemplars
        .iter()
        .map(|e| (e, query.distance(&e.key.vector)))
        .collect();

    ranked.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            // Equidistant exemplars: the more recent one ranks first.
            .then_with(|| b.0.recorded_at.cmp(&a.0.recorded_at))
    });
    ranked.truncate(k);

    let mut pull = [0.0; FEATURE_DIM];
    let mut signal_sum = 0.0;
    let mut weight_sum = 0.0;

    for (exemplar, distance) in &ranked {
        let weight = 1.0 / (1.0 + distance);
        let score = exemplar.effective_score();
        signal_sum += weight * score;
        weight_sum += weight;

        let neighbor = exemplar.key.vector.features();
        let here = query.features();
        for i in 0..FEATURE_DIM {
            // Positive outcomes pull the pipeline toward the neighbor's
            // feature region; negative outcomes push away from it.
            pull[i] += weight * score * (neighbor[i] - here[i]);
        }
    }

    if weight_sum > 0.0 {
        for value in pull.iter_mut() {
            *value /= weight_sum;
        }
        (pull, signal_sum / weight_sum)
    } else {
        ([0.0; FEATURE_DIM], 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::encoding::encode;
    use crate::domain::memory::{absorb_outcome, add};
    use crate::domain::outcome::{score, TruthAssessment};
    use crate::domain::signals::{QueryAnalysis, QueryDomain, SignalSnapshot, TopologicalSignature};
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn snapshot(confidence: f64) -> SignalSnapshot {
        SignalSnapshot::new(
            confidence,
            0.2,
            0.1,
            0.8,
            0.0,
            TopologicalSignature::trivial(),
        )
    }

    fn analysis() -> QueryAnalysis {
        QueryAnalysis::new(QueryDomain::Research, 0.5, 1, 10)
    }

    fn memory_with_runs(verdicts: &[(f64, f64)]) -> SteeringMemory {
        // (confidence, truth verdict) pairs
        let config = SteeringConfig::default();
        let mut memory = SteeringMemory::new();
        for (i, (confidence, verdict)) in verdicts.iter().enumerate() {
            let signals = snapshot(*confidence);
            let key = encode(&signals, &analysis(), Uuid::from_u128(i as u128));
            let outcome = score(&signals, Some(&TruthAssessment::new(*verdict)));
            memory = add(&memory, key, outcome, &config, epoch());
            let exemplar = memory.exemplars.last().unwrap().clone();
            memory = absorb_outcome(&memory, &exemplar, &config, epoch());
        }
        memory
    }

    #[test]
    fn test_disabled_gate_is_hard() {
        let memory = memory_with_runs(&[(0.9, 1.0), (0.8, 1.0)]);
        let config = SteeringConfig {
            enabled: false,
            master_strength: 1.0,
            ..Default::default()
        };
        let query = QueryFeatureVector::from_analysis(&analysis());

        let bias = compute_bias(&memory, &query, &config);
        assert_eq!(bias, SteeringBias::neutral());
    }

    #[test]
    fn test_empty_memory_yields_neutral() {
        let config = SteeringConfig::default();
        let query = QueryFeatureVector::from_analysis(&analysis());
        let bias = compute_bias(&SteeringMemory::new(), &query, &config);
        assert!(bias.is_neutral());
    }

    #[test]
    fn test_zero_strength_yields_neutral() {
        let memory = memory_with_runs(&[(0.9, 1.0)]);
        let config = SteeringConfig {
            master_strength: 0.0,
            ..Default::default()
        };
        let query = QueryFeatureVector::from_analysis(&analysis());
        assert!(compute_bias(&memory, &query, &config).is_neutral());
    }

    #[test]
    fn test_positive_history_produces_positive_signals() {
        let memory = memory_with_runs(&[(0.9, 1.0), (0.85, 1.0), (0.88, 1.0)]);
        let config = SteeringConfig {
            master_strength: 1.0,
            ..Default::default()
        };
        let query = QueryFeatureVector::from_analysis(&analysis());

        let bias = compute_bias(&memory, &query, &config);
        assert!(bias.prior_signal > 0.0);
        assert!(bias.exemplar_signal > 0.0);
        assert!(!bias.is_neutral());
    }

    #[test]
    fn test_negative_history_flips_the_signal() {
        let memory = memory_with_runs(&[(0.9, -1.0), (0.85, -1.0)]);
        let config = SteeringConfig {
            master_strength: 1.0,
            ..Default::default()
        };
        let query = QueryFeatureVector::from_analysis(&analysis());

        let bias = compute_bias(&memory, &query, &config);
        assert!(bias.prior_signal < 0.0);
        assert!(bias.exemplar_signal < 0.0);
    }

    #[test]
    fn test_master_strength_scales_adjustments() {
        let memory = memory_with_runs(&[(0.9, 1.0), (0.85, 1.0)]);
        let query = QueryFeatureVector::from_analysis(&analysis());

        let full = compute_bias(
            &memory,
            &query,
            &SteeringConfig {
                master_strength: 1.0,
                ..Default::default()
            },
        );
        let half = compute_bias(
            &memory,
            &query,
            &SteeringConfig {
                master_strength: 0.5,
                ..Default::default()
            },
        );

        for i in 0..FEATURE_DIM {
            assert!((half.adjustments[i] - full.adjustments[i] * 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_equidistant_tie_broken_by_recency() {
        let config = SteeringConfig {
            master_strength: 1.0,
            neighbor_count: 1,
            ..Default::default()
        };

        // Two exemplars with identical vectors (equidistant from any query)
        // but opposite outcomes; the newer one must win the K=1 slot.
        let signals = snapshot(0.9);
        let old_key = encode(&signals, &analysis(), Uuid::from_u128(1));
        let new_key = encode(&signals, &analysis(), Uuid::from_u128(2));

        let old_outcome = score(&signals, Some(&TruthAssessment::new(-1.0)));
        let new_outcome = score(&signals, Some(&TruthAssessment::new(1.0)));

        let memory = add(&SteeringMemory::new(), old_key, old_outcome, &config, epoch());
        let memory = add(
            &memory,
            new_key,
            new_outcome,
            &config,
            epoch() + Duration::hours(1),
        );

        let query = QueryFeatureVector::from_analysis(&analysis());
        let bias = compute_bias(&memory, &query, &config);
        assert!(bias.exemplar_signal > 0.0, "recent positive exemplar should win the tie");
    }

    #[test]
    fn test_adjustments_stay_bounded() {
        let memory = memory_with_runs(&[(1.0, 1.0), (0.0, -1.0), (1.0, 1.0), (0.0, -1.0)]);
        let config = SteeringConfig {
            master_strength: 1.0,
            ..Default::default()
        };
        let query = QueryFeatureVector::from_analysis(&analysis());

        let bias = compute_bias(&memory, &query, &config);
        for adjustment in &bias.adjustments {
            assert!((-1.0..=1.0).contains(adjustment));
        }
    }
}

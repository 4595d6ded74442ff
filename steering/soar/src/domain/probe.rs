// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Difficulty probe — decides whether a query is worth the iteration cost.
//!
//! Difficulty blends inverted confidence, entropy, dissonance and the triage
//! complexity score. A query whose difficulty sits below the configured floor
//! while confidence holds above its floor skips SOAR entirely: cheap queries
//! do not pay for the loop.

use serde::{Deserialize, Serialize};

use aegis_steering::domain::{QueryAnalysis, SignalSnapshot};

use super::config::SoarConfig;

const CONFIDENCE_WEIGHT: f64 = 0.35;
const ENTROPY_WEIGHT: f64 = 0.25;
const DISSONANCE_WEIGHT: f64 = 0.20;
const COMPLEXITY_WEIGHT: f64 = 0.20;

/// Outcome of probing the target query once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProbe {
    /// Estimated difficulty in [0, 1].
    pub difficulty: f64,
    /// Whether the query sits at the edge of the system's competence.
    pub at_edge: bool,
    /// Whether the loop should be skipped for this query.
    pub skip_soar: bool,
    pub reason: String,
}

/// Estimate difficulty from the baseline run's signals and analysis.
pub fn probe_difficulty(
    signals: &SignalSnapshot,
    analysis: &QueryAnalysis,
    config: &SoarConfig,
) -> DifficultyProbe {
    let difficulty = (CONFIDENCE_WEIGHT * (1.0 - signals.confidence)
        + ENTROPY_WEIGHT * signals.entropy
        + DISSONANCE_WEIGHT * signals.dissonance
        + COMPLEXITY_WEIGHT * analysis.complexity)
        .clamp(0.0, 1.0);

    let at_edge = signals.confidence < config.confidence_floor
        || signals.entropy > config.entropy_ceiling
        || signals.dissonance > config.dissonance_ceiling;

    let skip_soar =
        !at_edge && difficulty < config.difficulty_floor && signals.confidence >= config.confidence_floor;

    let reason = format!(
        "difficulty={difficulty:.2}, confidence={:.2}, entropy={:.2}, dissonance={:.2}, at_edge={at_edge}",
        signals.confidence, signals.entropy, signals.dissonance
    );

    DifficultyProbe {
        difficulty,
        at_edge,
        skip_soar,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_steering::domain::{QueryDomain, TopologicalSignature};

    fn signals(confidence: f64, entropy: f64, dissonance: f64) -> SignalSnapshot {
        SignalSnapshot::new(
            confidence,
            entropy,
            dissonance,
            0.8,
            0.0,
            TopologicalSignature::trivial(),
        )
    }

    fn analysis(complexity: f64) -> QueryAnalysis {
        QueryAnalysis::new(QueryDomain::Research, complexity, 0, 12)
    }

    #[test]
    fn test_easy_confident_query_skips_soar() {
        let probe = probe_difficulty(
            &signals(0.95, 0.05, 0.05),
            &analysis(0.1),
            &SoarConfig::default(),
        );
        assert!(probe.skip_soar);
        assert!(!probe.at_edge);
    }

    #[test]
    fn test_low_confidence_marks_the_edge() {
        let probe = probe_difficulty(
            &signals(0.2, 0.3, 0.2),
            &analysis(0.5),
            &SoarConfig::default(),
        );
        assert!(probe.at_edge);
        assert!(!probe.skip_soar);
    }

    #[test]
    fn test_high_entropy_marks_the_edge_even_when_confident() {
        let probe = probe_difficulty(
            &signals(0.9, 0.9, 0.1),
            &analysis(0.2),
            &SoarConfig::default(),
        );
        assert!(probe.at_edge);
        assert!(!probe.skip_soar);
    }

    #[test]
    fn test_difficulty_is_bounded() {
        let probe = probe_difficulty(
            &signals(0.0, 1.0, 1.0),
            &analysis(1.0),
            &SoarConfig::default(),
        );
        assert!(probe.difficulty <= 1.0);
        assert!(probe.difficulty >= 0.0);
    }
}

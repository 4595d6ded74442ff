// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Outcome scorer — collapses a run's signal state into one composite score.
//!
//! When an external truth assessment exists it dominates; otherwise the score
//! falls back to an auto-quality heuristic over the signal state. The
//! fallback lets the engine learn without explicit judgments, at the cost of
//! possibly reinforcing its own miscalibration — callers that need ground
//! truth must supply a [`TruthAssessment`].

use serde::{Deserialize, Serialize};

use super::signals::SignalSnapshot;

/// Externally supplied ground-truth judgment for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthAssessment {
    /// Verdict in [-1, 1]: -1 fully wrong, +1 fully correct.
    pub verdict: f64,
}

impl TruthAssessment {
    pub fn new(verdict: f64) -> Self {
        Self {
            verdict: if verdict.is_finite() {
                verdict.clamp(-1.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

/// Scored outcome of one pipeline run. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteeringOutcome {
    /// Composite quality score in [-1, 1].
    pub composite_score: f64,
    /// Signal state that contributed to the score.
    pub signals: SignalSnapshot,
    /// Ground truth, when one was supplied.
    pub truth: Option<TruthAssessment>,
}

impl SteeringOutcome {
    /// Whether the score is informative enough to update priors.
    pub fn is_informative(&self, outcome_threshold: f64) -> bool {
        self.composite_score.abs() > outcome_threshold
    }

    /// Whether the outcome counts as positive evidence.
    pub fn is_positive(&self) -> bool {
        self.composite_score > 0.0
    }
}

/// Weights of the auto-quality fallback. Confidence carries the most signal;
/// entropy and dissonance enter inverted.
const CONFIDENCE_WEIGHT: f64 = 0.35;
const ENTROPY_WEIGHT: f64 = 0.25;
const DISSONANCE_WEIGHT: f64 = 0.20;
const HEALTH_WEIGHT: f64 = 0.20;

/// Penalty slope applied per unit of risk above the 1.0 alarm line.
const RISK_ALARM_SLOPE: f64 = 0.25;

/// Score one run. Ground truth beats heuristic signal state.
pub fn score(signals: &SignalSnapshot, truth: Option<&TruthAssessment>) -> SteeringOutcome {
    let composite_score = match truth {
        Some(assessment) => assessment.verdict,
        None => auto_quality(signals),
    };

    SteeringOutcome {
        composite_score: composite_score.clamp(-1.0, 1.0),
        signals: *signals,
        truth: truth.copied(),
    }
}

fn auto_quality(signals: &SignalSnapshot) -> f64 {
    let quality = CONFIDENCE_WEIGHT * signals.confidence
        + ENTROPY_WEIGHT * (1.0 - signals.entropy)
        + DISSONANCE_WEIGHT * (1.0 - signals.dissonance)
        + HEALTH_WEIGHT * signals.health_score;

    let mut scored = 2.0 * quality - 1.0;
    if signals.risk_score > 1.0 {
        scored -= RISK_ALARM_SLOPE * (signals.risk_score - 1.0);
    }
    scored
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! SOAR loop configuration. External, read-only to the controller.

use serde::{Deserialize, Serialize};

/// Weights of the composite reward terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    pub confidence: f64,
    /// Applied to inverted entropy.
    pub entropy: f64,
    /// Applied to inverted dissonance.
    pub dissonance: f64,
    pub health: f64,
    /// Applied to the topological-signature term.
    pub topology: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            confidence: 0.30,
            entropy: 0.20,
            dissonance: 0.20,
            health: 0.20,
            topology: 0.10,
        }
    }
}

/// Knobs for one SOAR session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoarConfig {
    /// Hard iteration ceiling.
    pub max_iterations: u32,
    /// Sub-attempts generated per iteration.
    pub stones_per_curriculum: usize,
    /// Below this confidence the query counts as edge-of-competence.
    pub confidence_floor: f64,
    /// Above this entropy the query counts as edge-of-competence.
    pub entropy_ceiling: f64,
    /// Above this dissonance the query counts as edge-of-competence.
    pub dissonance_ceiling: f64,
    /// Probed difficulty below this floor skips SOAR entirely.
    pub difficulty_floor: f64,
    /// Minimum reward improvement for an iteration to count as progress.
    pub min_reward_threshold: f64,
    pub reward_weights: RewardWeights,
    /// Token budget; crossing it is a convergence trigger, not an error.
    pub api_cost_cap_tokens: u64,
    pub contradiction_detection: bool,
    /// Upper bound on claims examined by the contradiction scan.
    pub max_contradiction_claims: usize,
}

impl Default for SoarConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            stones_per_curriculum: 4,
            confidence_floor: 0.45,
            entropy_ceiling: 0.70,
            dissonance_ceiling: 0.60,
            difficulty_floor: 0.35,
            min_reward_threshold: 0.02,
            reward_weights: RewardWeights::default(),
            api_cost_cap_tokens: 60_000,
            contradiction_detection: true,
            max_contradiction_claims: 32,
        }
    }
}

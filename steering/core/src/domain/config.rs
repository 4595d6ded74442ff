// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! User-controlled steering configuration. Read-only to the engine.

use serde::{Deserialize, Serialize};

/// Knobs for the steering memory and bias computer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Master on/off switch. When false, bias computation is hard-gated to
    /// neutral regardless of memory contents.
    pub enabled: bool,
    /// Master strength dial in [0, 1] scaling the final bias.
    pub master_strength: f64,
    /// Exponential prior decay rate, per day.
    pub decay_rate: f64,
    /// Minimum |composite score| for an outcome to update priors.
    pub outcome_threshold: f64,
    /// Exemplar list cap; oldest entries are evicted first.
    pub max_exemplars: usize,
    /// K for nearest-exemplar lookup in the bias computer.
    pub neighbor_count: usize,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            master_strength: 0.5,
            decay_rate: 0.05,
            outcome_threshold: 0.15,
            max_exemplars: 256,
            neighbor_count: 5,
        }
    }
}

impl SteeringConfig {
    /// Clamp out-of-range knobs into their documented domains.
    pub fn sanitized(mut self) -> Self {
        self.master_strength = if self.master_strength.is_finite() {
            self.master_strength.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.decay_rate = if self.decay_rate.is_finite() {
            self.decay_rate.max(0.0)
        } else {
            0.0
        };
        self.outcome_threshold = if self.outcome_threshold.is_finite() {
            self.outcome_threshold.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.max_exemplars = self.max_exemplars.max(1);
        self.neighbor_count = self.neighbor_count.max(1);
        self
    }
}

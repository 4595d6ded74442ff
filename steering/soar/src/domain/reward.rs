// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Multi-dimensional reward over one iteration's settled attempts.
//!
//! Reward is a weighted sum of confidence, inverted entropy, inverted
//! dissonance, health, and a topological-signature term. An iteration counts
//! as improvement only when its composite clears the running baseline by the
//! configured threshold.

use serde::{Deserialize, Serialize};

use aegis_steering::domain::SignalSnapshot;

use super::config::RewardWeights;
use super::session::AttemptRecord;

const CYCLE_CEILING: f64 = 8.0;

/// Per-term breakdown of one iteration's reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub iteration: u32,
    pub confidence_term: f64,
    pub entropy_term: f64,
    pub dissonance_term: f64,
    pub health_term: f64,
    pub topology_term: f64,
    pub composite: f64,
}

/// Score a single snapshot with the given weights.
pub fn reward_for_signals(iteration: u32, signals: &SignalSnapshot, weights: &RewardWeights) -> RewardBreakdown {
    let confidence_term = weights.confidence * signals.confidence;
    let entropy_term = weights.entropy * (1.0 - signals.entropy);
    let dissonance_term = weights.dissonance * (1.0 - signals.dissonance);
    let health_term = weights.health * signals.health_score;
    let topology_term = weights.topology * topology_quality(signals);

    RewardBreakdown {
        iteration,
        confidence_term,
        entropy_term,
        dissonance_term,
        health_term,
        topology_term,
        composite: confidence_term + entropy_term + dissonance_term + health_term + topology_term,
    }
}

/// Score one iteration from its settled attempts.
///
/// Failed attempts carry no signals and are excluded; returns `None` when no
/// attempt in the iteration succeeded.
pub fn reward_for_iteration(
    iteration: u32,
    attempts: &[AttemptRecord],
    weights: &RewardWeights,
) -> Option<RewardBreakdown> {
    let aggregated = aggregate_signals(attempts)?;
    Some(reward_for_signals(iteration, &aggregated, weights))
}

/// Mean signal state over the iteration's successful attempts.
pub fn aggregate_signals(attempts: &[AttemptRecord]) -> Option<SignalSnapshot> {
    let snapshots: Vec<&SignalSnapshot> = attempts.iter().filter_map(|a| a.signals.as_ref()).collect();
    if snapshots.is_empty() {
        return None;
    }

    let n = snapshots.len() as f64;
    let mean = |f: fn(&SignalSnapshot) -> f64| snapshots.iter().map(|s| f(s)).sum::<f64>() / n;

    let topology = {
        let components =
            snapshots.iter().map(|s| s.topology.component_count).sum::<u32>() / snapshots.len() as u32;
        let cycles = snapshots.iter().map(|s| s.topology.cycle_count).sum::<u32>() / snapshots.len() as u32;
        let entropy = snapshots.iter().map(|s| s.topology.persistence_entropy).sum::<f64>() / n;
        let persistence = snapshots.iter().map(|s| s.topology.max_persistence).sum::<f64>() / n;
        aegis_steering::domain::TopologicalSignature::new(components, cycles, entropy, persistence)
    };

    Some(SignalSnapshot::new(
        mean(|s| s.confidence),
        mean(|s| s.entropy),
        mean(|s| s.dissonance),
        mean(|s| s.health_score),
        mean(|s| s.risk_score),
        topology,
    ))
}

/// Structural-quality term in [0, 1]: tangled traces (high persistence
/// entropy, many cycles) score low.
fn topology_quality(signals: &SignalSnapshot) -> f64 {
    let entropy_part = 1.0 - signals.topology.normalized_entropy();
    let cycle_part = 1.0 - (signals.topology.cycle_count as f64 / CYCLE_CEILING).min(1.0);
    0.5 * entropy_part + 0.5 * cycle_part
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pipeline signal snapshots and query-analysis inputs.
//!
//! One [`SignalSnapshot`] is produced per reasoning-pipeline run. Callers may
//! supply partial telemetry; non-finite fields are replaced with neutral
//! midpoints instead of being rejected (availability over strict validation).

use serde::{Deserialize, Serialize};

/// Neutral midpoint used for any missing or non-finite signal field.
pub const NEUTRAL_SIGNAL: f64 = 0.5;

/// Structural-complexity summary of a reasoning trace.
///
/// `component_count` and `cycle_count` correspond to the Betti-0/Betti-1
/// numbers of the activation point cloud; `persistence_entropy` and
/// `max_persistence` summarize the persistence diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopologicalSignature {
    pub component_count: u32,
    pub cycle_count: u32,
    pub persistence_entropy: f64,
    pub max_persistence: f64,
}

impl TopologicalSignature {
    pub fn new(
        component_count: u32,
        cycle_count: u32,
        persistence_entropy: f64,
        max_persistence: f64,
    ) -> Self {
        Self {
            component_count,
            cycle_count,
            persistence_entropy: finite_or_zero(persistence_entropy),
            max_persistence: finite_or_zero(max_persistence),
        }
    }

    /// Signature of a trivially simple trace (single component, no cycles).
    pub fn trivial() -> Self {
        Self {
            component_count: 1,
            cycle_count: 0,
            persistence_entropy: 0.0,
            max_persistence: 0.0,
        }
    }

    /// Persistence entropy normalized into [0, 1] against a fixed ceiling.
    pub fn normalized_entropy(&self) -> f64 {
        (self.persistence_entropy / 3.0).clamp(0.0, 1.0)
    }
}

/// Immutable per-run signal snapshot emitted by the reasoning pipeline.
///
/// All scalar signals live in [0, 1] except `risk_score`, which may exceed
/// 1.0 as an alarm multiplier and is deliberately left unclamped here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub confidence: f64,
    pub entropy: f64,
    pub dissonance: f64,
    pub health_score: f64,
    pub risk_score: f64,
    pub topology: TopologicalSignature,
}

impl SignalSnapshot {
    /// Build a snapshot, sanitizing malformed input.
    ///
    /// Non-finite unit-interval fields fall back to [`NEUTRAL_SIGNAL`];
    /// a non-finite risk score falls back to 0.0 (no alarm).
    pub fn new(
        confidence: f64,
        entropy: f64,
        dissonance: f64,
        health_score: f64,
        risk_score: f64,
        topology: TopologicalSignature,
    ) -> Self {
        Self {
            confidence: sanitize_unit(confidence),
            entropy: sanitize_unit(entropy),
            dissonance: sanitize_unit(dissonance),
            health_score: sanitize_unit(health_score),
            risk_score: if risk_score.is_finite() && risk_score >= 0.0 {
                risk_score
            } else {
                0.0
            },
            topology,
        }
    }

    /// Fully neutral snapshot, used when no telemetry is available at all.
    pub fn neutral() -> Self {
        Self {
            confidence: NEUTRAL_SIGNAL,
            entropy: NEUTRAL_SIGNAL,
            dissonance: NEUTRAL_SIGNAL,
            health_score: NEUTRAL_SIGNAL,
            risk_score: 0.0,
            topology: TopologicalSignature::trivial(),
        }
    }
}

/// Reasoning domain detected for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryDomain {
    Research,
    Legal,
    Strategy,
    Creative,
    General,
}

impl QueryDomain {
    /// Stable ordinal used by the feature encoder.
    pub fn ordinal(&self) -> u32 {
        match self {
            QueryDomain::Research => 0,
            QueryDomain::Legal => 1,
            QueryDomain::Strategy => 2,
            QueryDomain::Creative => 3,
            QueryDomain::General => 4,
        }
    }

    pub const VARIANT_COUNT: u32 = 5;
}

/// Query-analysis snapshot supplied by the pipeline alongside the signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub domain: QueryDomain,
    /// Triage complexity score in [0, 1].
    pub complexity: f64,
    /// Coarse topic-cluster label assigned by the pipeline's triage stage.
    pub topic_cluster: u32,
    /// Token count of the query, used as a cheap length feature.
    pub term_count: u32,
}

impl QueryAnalysis {
    pub fn new(domain: QueryDomain, complexity: f64, topic_cluster: u32, term_count: u32) -> Self {
        Self {
            domain,
            complexity: sanitize_unit(complexity),
            topic_cluster,
            term_count,
        }
    }

    /// Neutral analysis for callers without a triage stage.
    pub fn neutral() -> Self {
        Self {
            domain: QueryDomain::General,
            complexity: NEUTRAL_SIGNAL,
            topic_cluster: 0,
            term_count: 0,
        }
    }
}

fn sanitize_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        NEUTRAL_SIGNAL
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

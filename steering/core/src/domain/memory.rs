// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Steering memory — the sole persisted aggregate.
//!
//! Holds a capped chronological exemplar list and the prior table. Every
//! mutation is copy-on-write: an immutable snapshot goes in, an updated
//! snapshot comes out, and the caller swaps the canonical reference
//! atomically. This keeps the whole path safe under the single-writer
//! discipline without locks inside the domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::SteeringConfig;
use super::encoding::SynthesisKey;
use super::outcome::SteeringOutcome;
use super::priors::{decay_priors, update_priors, PriorTable};

/// One remembered pipeline run.
///
/// `user_rating` is the only field ever mutated after creation, via
/// [`rate`]; everything else is frozen at record time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemplar {
    pub key: SynthesisKey,
    pub outcome: SteeringOutcome,
    pub user_rating: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl Exemplar {
    /// Outcome signal with any explicit user rating taking precedence over
    /// the recorded composite score.
    pub fn effective_score(&self) -> f64 {
        match self.user_rating {
            Some(rating) => rating.clamp(-1.0, 1.0),
            None => self.outcome.composite_score,
        }
    }
}

/// Exemplar list + prior table. Insertion order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringMemory {
    pub exemplars: Vec<Exemplar>,
    pub priors: PriorTable,
}

impl SteeringMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty() && self.priors.is_empty()
    }

    /// Most recent exemplar matching `key_id`, if any (last-write-wins).
    pub fn find_exemplar(&self, key_id: &str) -> Option<&Exemplar> {
        self.exemplars.iter().rev().find(|e| e.key.id == key_id)
    }
}

/// Append an exemplar, evicting the oldest entries past the configured cap.
pub fn add(
    memory: &SteeringMemory,
    key: SynthesisKey,
    outcome: SteeringOutcome,
    config: &SteeringConfig,
    now: DateTime<Utc>,
) -> SteeringMemory {
    let mut next = memory.clone();
    next.exemplars.push(Exemplar {
        key,
        outcome,
        user_rating: None,
        recorded_at: now,
    });

    let cap = config.max_exemplars.max(1);
    if next.exemplars.len() > cap {
        let overflow = next.exemplars.len() - cap;
        next.exemplars.drain(0..overflow);
    }
    next
}

/// Result of a rating attempt.
pub struct Rated {
    pub memory: SteeringMemory,
    /// The rated exemplar, when the id was known. `None` means the rating
    /// was a no-op and `memory` is an unchanged clone of the input.
    pub exemplar: Option<Exemplar>,
}

/// Attach a user rating to the exemplar with `key_id`.
///
/// Duplicate ids resolve last-write-wins (the most recent run for that key
/// receives the rating). Unknown ids are a silent no-op. The caller is
/// responsible for re-triggering prior updates from the new outcome.
pub fn rate(memory: &SteeringMemory, key_id: &str, rating: f64) -> Rated {
    let mut next = memory.clone();
    let position = next.exemplars.iter().rposition(|e| e.key.id == key_id);

    match position {
        Some(idx) => {
            let clamped = if rating.is_finite() {
                rating.clamp(-1.0, 1.0)
            } else {
                0.0
            };
            next.exemplars[idx].user_rating = Some(clamped);
            let exemplar = next.exemplars[idx].clone();
            Rated {
                memory: next,
                exemplar: Some(exemplar),
            }
        }
        None => Rated {
            memory: next,
            exemplar: None,
        },
    }
}

/// Refresh time-decay across the prior table.
///
/// Idempotent for a fixed `now`; see [`decay_priors`].
pub fn decay_refresh(memory: &SteeringMemory, now: DateTime<Utc>, decay_rate: f64) -> SteeringMemory {
    SteeringMemory {
        exemplars: memory.exemplars.clone(),
        priors: decay_priors(&memory.priors, now, decay_rate),
    }
}

/// Fold a freshly scored (or re-rated) exemplar into the prior table,
/// gated on the configured informativeness threshold.
pub fn absorb_outcome(
    memory: &SteeringMemory,
    exemplar: &Exemplar,
    config: &SteeringConfig,
    now: DateTime<Utc>,
) -> SteeringMemory {
    let effective = exemplar.effective_score();
    if effective.abs() <= config.outcome_threshold {
        return memory.clone();
    }

    SteeringMemory {
        exemplars: memory.exemplars.clone(),
        priors: update_priors(&memory.priors, &exemplar.key.vector, effective > 0.0, now),
    }
}

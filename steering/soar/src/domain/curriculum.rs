// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Curriculum builder — reframed sub-attempts for one SOAR iteration.
//!
//! Each stone is a narrowed or reframed version of the target query. The
//! strategy rotation is offset by iteration so successive iterations probe
//! the query from different angles instead of repeating themselves.

use serde::{Deserialize, Serialize};

/// How a stone reframes the target query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReframeStrategy {
    /// Restrict to the single strongest sub-question.
    Narrow,
    /// Split into explicit component questions.
    Decompose,
    /// Ask for the strongest case against the working conclusion.
    CounterEvidence,
    /// Restate from an alternative framing.
    Reframe,
    /// Stress boundary conditions and extremes.
    EdgeCase,
}

impl ReframeStrategy {
    const ALL: [ReframeStrategy; 5] = [
        ReframeStrategy::Narrow,
        ReframeStrategy::Decompose,
        ReframeStrategy::CounterEvidence,
        ReframeStrategy::Reframe,
        ReframeStrategy::EdgeCase,
    ];

    /// Render the reframed query text for this strategy.
    pub fn apply(&self, target: &str) -> String {
        match self {
            ReframeStrategy::Narrow => {
                format!("Focus on the single most load-bearing part of: {target}")
            }
            ReframeStrategy::Decompose => {
                format!("Break into component questions and answer each: {target}")
            }
            ReframeStrategy::CounterEvidence => {
                format!("Argue the strongest case against the expected answer to: {target}")
            }
            ReframeStrategy::Reframe => {
                format!("Restate and answer from an alternative framing: {target}")
            }
            ReframeStrategy::EdgeCase => {
                format!("Probe the boundary conditions and extremes of: {target}")
            }
        }
    }
}

/// One sub-attempt within a curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumStone {
    pub index: usize,
    pub strategy: ReframeStrategy,
    pub query: String,
}

/// The batch of stones generated for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    pub iteration: u32,
    pub stones: Vec<CurriculumStone>,
}

/// Build the curriculum for `iteration` (1-based).
pub fn build_curriculum(target_query: &str, iteration: u32, stones_per_curriculum: usize) -> Curriculum {
    let count = stones_per_curriculum.max(1);
    let offset = (iteration.saturating_sub(1) as usize) % ReframeStrategy::ALL.len();

    let stones = (0..count)
        .map(|index| {
            let strategy = ReframeStrategy::ALL[(offset + index) % ReframeStrategy::ALL.len()];
            CurriculumStone {
                index,
                strategy,
                query: strategy.apply(target_query),
            }
        })
        .collect();

    Curriculum { iteration, stones }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stone_count_matches_config() {
        let curriculum = build_curriculum("why do markets crash", 1, 4);
        assert_eq!(curriculum.stones.len(), 4);
    }

    #[test]
    fn test_zero_stones_clamps_to_one() {
        let curriculum = build_curriculum("q", 1, 0);
        assert_eq!(curriculum.stones.len(), 1);
    }

    #[test]
    fn test_iterations_rotate_strategies() {
        let first = build_curriculum("q", 1, 2);
        let second = build_curriculum("q", 2, 2);
        assert_ne!(first.stones[0].strategy, second.stones[0].strategy);
    }

    #[test]
    fn test_stone_queries_embed_the_target() {
        let curriculum = build_curriculum("does creatine improve memory", 1, 5);
        for stone in &curriculum.stones {
            assert!(stone.query.contains("does creatine improve memory"));
        }
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain layer for the SOAR bounded context.

pub mod config;
pub mod contradiction;
pub mod curriculum;
pub mod pipeline;
pub mod probe;
pub mod reward;
pub mod session;

pub use config::{RewardWeights, SoarConfig};
pub use contradiction::{scan_claims, ContradictionFlag, ContradictionScan};
pub use curriculum::{build_curriculum, Curriculum, CurriculumStone, ReframeStrategy};
pub use pipeline::{Claim, PipelineError, PipelineRunOutput, Polarity, ReasoningPipeline};
pub use probe::{probe_difficulty, DifficultyProbe};
pub use reward::{aggregate_signals, reward_for_iteration, reward_for_signals, RewardBreakdown};
pub use session::{AttemptRecord, SessionId, SessionStatus, SoarSession};

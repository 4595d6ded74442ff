// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `aegis-steering-soar` — Self-Optimizing Adaptive Reasoning Loop
//!
//! Bounded iterative refinement for queries at the edge of the pipeline's
//! competence: probe difficulty, build a curriculum of reframed sub-attempts,
//! execute them concurrently, score a multi-weighted reward, and iterate
//! until improvement stalls, the iteration ceiling is hit, or the token
//! budget runs out. An independent contradiction scan flags mutually
//! inconsistent claims across attempts.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | session aggregate, probe, curriculum, reward, contradiction scan, pipeline port |
//! | [`application`] | Application | `SoarController` state machine |
//!
//! ## Key Concepts
//!
//! - **Curriculum**: the batch of reframed sub-queries generated for one
//!   iteration; stones execute concurrently and are scored only after all
//!   of them settle.
//! - **Single active session**: a new session request while one is running
//!   is rejected, not queued.
//! - **Fold-back**: a completed session's final signals re-enter the
//!   steering memory through the same encode/score/remember path as any
//!   other pipeline run.

pub mod application;
pub mod domain;

pub use application::*;
pub use domain::*;

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `aegis-steering-core` — Steering Memory & Bias Engine
//!
//! Closed-loop learn-from-outcome engine for the AEGIS reasoning pipeline:
//! every pipeline run is encoded into a stable synthesis key, scored, and
//! remembered; future runs read a steering bias blended from Bayesian priors
//! and the nearest remembered exemplars.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | signal snapshots, encoder, scorer, memory aggregate, priors, bias computer |
//! | [`application`] | Application | `SteeringService` consumer API, maintenance scheduler |
//! | [`infrastructure`] | Infrastructure | state-store port + adapters, snapshot codec, event bus |
//!
//! ## Key Concepts
//!
//! - **Synthesis key**: reproducible identity of one run's (query, signal)
//!   pair; identical inputs always hash to the same key, so replays are
//!   idempotent and user ratings can find their run after the fact.
//! - **Steering memory**: capped chronological exemplar list plus a decaying
//!   prior table — the sole persisted aggregate, mutated copy-on-write.
//! - **Steering bias**: the only consumer-facing output; neutral whenever
//!   steering is disabled or the memory is empty.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;

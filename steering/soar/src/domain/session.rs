// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! SOAR session aggregate.
//!
//! A session is created when the loop starts, mutated only by the
//! controller, and terminal once its status leaves `Running`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_steering::domain::{QueryAnalysis, SignalSnapshot};

use super::contradiction::ContradictionScan;
use super::curriculum::{Curriculum, CurriculumStone};
use super::pipeline::Claim;
use super::probe::DifficultyProbe;
use super::reward::RewardBreakdown;

/// Unique identifier for a [`SoarSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Complete,
    Error,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

/// One settled curriculum-stone execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub stone: CurriculumStone,
    /// Present only when the attempt succeeded.
    pub signals: Option<SignalSnapshot>,
    pub analysis: Option<QueryAnalysis>,
    pub claims: Vec<Claim>,
    pub tokens_spent: u64,
    /// Present only when the attempt failed.
    pub error: Option<String>,
}

impl AttemptRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.signals.is_some()
    }
}

/// State-machine instance for one SOAR run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoarSession {
    pub id: SessionId,
    pub target_query: String,
    pub probe: Option<DifficultyProbe>,
    pub curricula: Vec<Curriculum>,
    /// Every settled attempt across all iterations, in execution order.
    pub attempts: Vec<AttemptRecord>,
    /// Attempts of the most recently scored iteration.
    pub final_attempts: Vec<AttemptRecord>,
    pub rewards: Vec<RewardBreakdown>,
    pub contradiction_scan: Option<ContradictionScan>,
    pub baseline_signals: Option<SignalSnapshot>,
    pub final_signals: Option<SignalSnapshot>,
    pub iterations_completed: u32,
    pub max_iterations: u32,
    /// Token-cost accumulator checked against the session budget.
    pub tokens_spent: u64,
    pub status: SessionStatus,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SoarSession {
    pub fn start(target_query: impl Into<String>, max_iterations: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            target_query: target_query.into(),
            probe: None,
            curricula: Vec::new(),
            attempts: Vec::new(),
            final_attempts: Vec::new(),
            rewards: Vec::new(),
            contradiction_scan: None,
            baseline_signals: None,
            final_signals: None,
            iterations_completed: 0,
            max_iterations,
            tokens_spent: 0,
            status: SessionStatus::Running,
            error: None,
            started_at: now,
            completed_at: None,
        }
    }

    /// All claims collected across attempts, in execution order.
    pub fn collected_claims(&self) -> Vec<Claim> {
        self.attempts.iter().flat_map(|a| a.claims.clone()).collect()
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Complete;
        self.completed_at = Some(now);
    }

    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = SessionStatus::Error;
        self.error = Some(message.into());
        self.completed_at = Some(now);
    }
}

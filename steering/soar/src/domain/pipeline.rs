// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Reasoning-pipeline collaborator port.
//!
//! The analytical pipeline itself (statistical, causal, Bayesian and
//! adversarial stages) lives outside this crate; SOAR only depends on the
//! signal shape it emits per run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aegis_steering::domain::{QueryAnalysis, SignalSnapshot};

/// Whether a claim asserts or denies its statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Affirms,
    Denies,
}

/// One factual claim surfaced during an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// What the claim is about; compared case-insensitively by the scan.
    pub subject: String,
    pub statement: String,
    pub polarity: Polarity,
}

impl Claim {
    pub fn new(subject: impl Into<String>, statement: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            subject: subject.into(),
            statement: statement.into(),
            polarity,
        }
    }

    /// Normalized subject used for contradiction matching.
    pub fn subject_key(&self) -> String {
        self.subject.trim().to_lowercase()
    }
}

/// Everything one pipeline run hands back to the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRunOutput {
    pub signals: SignalSnapshot,
    pub analysis: QueryAnalysis,
    pub claims: Vec<Claim>,
    /// Tokens the run consumed, fed into the session cost accumulator.
    pub tokens_spent: u64,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline execution failed: {0}")]
    Execution(String),

    #[error("pipeline unavailable: {0}")]
    Unavailable(String),
}

/// External reasoning pipeline invoked once per probe or curriculum stone.
#[async_trait]
pub trait ReasoningPipeline: Send + Sync {
    /// Run one query through the full pipeline and return its signal state.
    async fn run_query(&self, query: &str) -> Result<PipelineRunOutput, PipelineError>;
}

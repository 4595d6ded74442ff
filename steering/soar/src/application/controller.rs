// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # SoarController — the self-optimizing adaptive reasoning loop
//!
//! Bounded iterative state machine: probe difficulty, build a curriculum of
//! reframed sub-attempts, execute them against the external pipeline, score
//! a multi-weighted reward, and decide to iterate, converge, or abort.
//!
//! ## Loop invariants
//!
//! - At most one session runs globally; a second request is rejected, not
//!   queued.
//! - Attempts within an iteration run concurrently, but scoring and state
//!   transition happen only after all of them settle.
//! - Abort is observed between iterations, never mid-attempt; the aborted
//!   session keeps its partial results.
//! - Crossing the token budget is a convergence trigger, not an error.
//! - A failed attempt is tolerated; an entirely failed iteration ends the
//!   session with `status == Error` and the last error retained.
//!
//! Completed sessions fold their final signals back into the steering
//! memory, closing the learn-from-outcome loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use aegis_steering::application::SteeringService;
use aegis_steering::domain::{Clock, QueryAnalysis};

use crate::domain::{
    build_curriculum, probe_difficulty, reward_for_iteration, reward_for_signals, scan_claims,
    aggregate_signals, AttemptRecord, ReasoningPipeline, SessionStatus, SoarConfig, SoarSession,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a SOAR session is already running")]
    AlreadyRunning,
}

pub struct SoarController {
    pipeline: Arc<dyn ReasoningPipeline>,
    steering: Arc<SteeringService>,
    clock: Arc<dyn Clock>,
    active: AtomicBool,
    cancel: Mutex<CancellationToken>,
}

/// Releases the single-session gate when the run ends, panics included.
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SoarController {
    pub fn new(
        pipeline: Arc<dyn ReasoningPipeline>,
        steering: Arc<SteeringService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pipeline,
            steering,
            clock,
            active: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Request cooperative abort of the running session.
    ///
    /// Observed between iterations; in-flight attempts settle first.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Run one SOAR session to completion.
    ///
    /// Returns `Err(SessionError::AlreadyRunning)` while another session is
    /// active. Pipeline failures never surface as `Err`: they end up in the
    /// returned session's status.
    pub async fn run_session(
        &self,
        target_query: &str,
        config: &SoarConfig,
    ) -> Result<SoarSession, SessionError> {
        let _gate = self.acquire()?;
        let cancel = {
            let mut slot = self.cancel.lock();
            *slot = CancellationToken::new();
            slot.clone()
        };

        let mut session = SoarSession::start(target_query, config.max_iterations, self.clock.now());
        info!(session_id = %session.id, query = target_query, "SOAR session started");

        // Probing
        let baseline = match self.pipeline.run_query(target_query).await {
            Ok(output) => output,
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "probe failed");
                session.fail(format!("probe failed: {e}"), self.clock.now());
                return Ok(session);
            }
        };
        session.tokens_spent += baseline.tokens_spent;
        session.baseline_signals = Some(baseline.signals);

        let probe = probe_difficulty(&baseline.signals, &baseline.analysis, config);
        debug!(session_id = %session.id, reason = %probe.reason, "probe settled");
        let skip = probe.skip_soar;
        session.probe = Some(probe);

        if skip {
            session.final_signals = Some(baseline.signals);
            session.complete(self.clock.now());
            info!(session_id = %session.id, "query below difficulty floor, SOAR skipped");
            self.fold_back(&session, &baseline.analysis).await;
            return Ok(session);
        }

        let mut best_reward =
            reward_for_signals(0, &baseline.signals, &config.reward_weights).composite;
        let mut last_analysis = baseline.analysis;

        for iteration in 1..=config.max_iterations {
            // Abort is only observed here, between iterations.
            if cancel.is_cancelled() {
                warn!(session_id = %session.id, iteration, "session aborted");
                session.fail("session aborted", self.clock.now());
                break;
            }

            // Budget exceedance is a normal convergence trigger.
            if session.tokens_spent >= config.api_cost_cap_tokens {
                info!(
                    session_id = %session.id,
                    tokens = session.tokens_spent,
                    cap = config.api_cost_cap_tokens,
                    "token budget reached, converging"
                );
                session.complete(self.clock.now());
                break;
            }

            // Curriculum build
            let curriculum = build_curriculum(target_query, iteration, config.stones_per_curriculum);
            session.curricula.push(curriculum.clone());

            // Attempting: concurrent execution, joined before scoring.
            let pending = curriculum.stones.iter().map(|stone| {
                let pipeline = self.pipeline.clone();
                let stone = stone.clone();
                async move {
                    let result = pipeline.run_query(&stone.query).await;
                    (stone, result)
                }
            });
            let settled = join_all(pending).await;

            let mut iteration_attempts = Vec::with_capacity(settled.len());
            for (stone, result) in settled {
                let record = match result {
                    Ok(output) => AttemptRecord {
                        stone,
                        signals: Some(output.signals),
                        analysis: Some(output.analysis),
                        claims: output.claims,
                        tokens_spent: output.tokens_spent,
                        error: None,
                    },
                    Err(e) => {
                        debug!(session_id = %session.id, error = %e, "attempt failed");
                        AttemptRecord {
                            stone,
                            signals: None,
                            analysis: None,
                            claims: Vec::new(),
                            tokens_spent: 0,
                            error: Some(e.to_string()),
                        }
                    }
                };
                session.tokens_spent += record.tokens_spent;
                iteration_attempts.push(record);
            }
            session.attempts.extend(iteration_attempts.iter().cloned());

            if iteration_attempts.iter().all(|a| !a.succeeded()) {
                let last_error = iteration_attempts
                    .iter()
                    .rev()
                    .find_map(|a| a.error.clone())
                    .unwrap_or_else(|| "all attempts failed".to_string());
                warn!(session_id = %session.id, iteration, "entire iteration failed");
                session.fail(
                    format!("iteration {iteration} failed entirely: {last_error}"),
                    self.clock.now(),
                );
                break;
            }

            // Scoring
            let Some(reward) =
                reward_for_iteration(iteration, &iteration_attempts, &config.reward_weights)
            else {
                continue;
            };
            let Some(aggregated) = aggregate_signals(&iteration_attempts) else {
                continue;
            };

            session.iterations_completed = iteration;
            if let Some(analysis) = iteration_attempts.iter().rev().find_map(|a| a.analysis) {
                last_analysis = analysis;
            }
            session.final_attempts = iteration_attempts;
            session.final_signals = Some(aggregated);

            let improvement = reward.composite - best_reward;
            debug!(
                session_id = %session.id,
                iteration,
                reward = reward.composite,
                improvement,
                "iteration scored"
            );
            session.rewards.push(reward.clone());

            if improvement < config.min_reward_threshold {
                info!(session_id = %session.id, iteration, "no reward improvement, converged");
                session.complete(self.clock.now());
                break;
            }
            best_reward = reward.composite;
        }

        // Iteration ceiling reached without another terminal transition.
        if session.status == SessionStatus::Running {
            session.complete(self.clock.now());
        }

        // Independent contradiction pass over everything the attempts claimed.
        if config.contradiction_detection {
            let claims = session.collected_claims();
            session.contradiction_scan = Some(scan_claims(&claims, config.max_contradiction_claims));
        }

        if session.status == SessionStatus::Complete {
            self.fold_back(&session, &last_analysis).await;
        }

        info!(
            session_id = %session.id,
            status = ?session.status,
            iterations = session.iterations_completed,
            tokens = session.tokens_spent,
            "SOAR session finished"
        );
        Ok(session)
    }

    fn acquire(&self) -> Result<ActiveGuard<'_>, SessionError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(ActiveGuard(&self.active))
        } else {
            Err(SessionError::AlreadyRunning)
        }
    }

    /// Fold the session's final signals back into the steering memory.
    async fn fold_back(&self, session: &SoarSession, analysis: &QueryAnalysis) {
        if let Some(signals) = &session.final_signals {
            let key_id = self
                .steering
                .record_pipeline_run(signals, analysis, session.id.0, None)
                .await;
            debug!(session_id = %session.id, %key_id, "final signals folded into steering memory");
        }
    }
}

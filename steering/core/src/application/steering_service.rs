// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # SteeringService — consumer API over the steering memory
//!
//! Owns the canonical [`SteeringMemory`] snapshot and coordinates the
//! encode → score → remember → learn path for every pipeline run. All domain
//! mutations are copy-on-write; the service swaps the canonical `Arc`
//! atomically after each one, giving the single-writer discipline the domain
//! layer assumes.
//!
//! Storage is a collaborator, not a dependency: a failed load falls back to
//! an empty memory and a failed save is logged and swallowed. The engine
//! keeps steering with whatever state it has.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    absorb_outcome, add, compute_bias, decay_refresh, encode, rate, score, Clock, QueryAnalysis,
    QueryFeatureVector, SignalSnapshot, SteeringBias, SteeringConfig, SteeringEvent,
    SteeringMemory, TruthAssessment,
};
use crate::infrastructure::{decode_snapshot, encode_snapshot, StateStore, SteeringEventBus};

/// Storage key the canonical memory snapshot lives under.
pub const MEMORY_STORE_KEY: &str = "steering/memory";

pub struct SteeringService {
    config: SteeringConfig,
    memory: RwLock<Arc<SteeringMemory>>,
    store: Arc<dyn StateStore>,
    events: SteeringEventBus,
    clock: Arc<dyn Clock>,
}

impl SteeringService {
    pub fn new(
        config: SteeringConfig,
        store: Arc<dyn StateStore>,
        events: SteeringEventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: config.sanitized(),
            memory: RwLock::new(Arc::new(SteeringMemory::new())),
            store,
            events,
            clock,
        }
    }

    /// Hydrate the canonical memory from the store.
    ///
    /// Unreadable or schema-mismatched state falls back to an empty memory —
    /// logged, never propagated.
    pub async fn load(&self) -> Result<()> {
        let restored = match self.store.load(MEMORY_STORE_KEY).await {
            Ok(Some(payload)) => match decode_snapshot(&payload) {
                Some(memory) => memory,
                None => {
                    warn!("stored steering memory is corrupt, starting empty");
                    SteeringMemory::new()
                }
            },
            Ok(None) => SteeringMemory::new(),
            Err(e) => {
                warn!(error = %e, "steering store unavailable, starting empty");
                SteeringMemory::new()
            }
        };

        let exemplar_count = restored.exemplars.len();
        self.swap(restored);
        self.events.publish(SteeringEvent::MemoryRestored {
            exemplar_count,
            timestamp: self.clock.now(),
        });
        info!(exemplar_count, "steering memory restored");
        Ok(())
    }

    /// Record one pipeline run: encode, score, remember, update priors.
    ///
    /// Returns the synthesis key id so callers can attach ratings later.
    pub async fn record_pipeline_run(
        &self,
        signals: &SignalSnapshot,
        analysis: &QueryAnalysis,
        context_ref: Uuid,
        truth: Option<&TruthAssessment>,
    ) -> String {
        let now = self.clock.now();
        let key = encode(signals, analysis, context_ref);
        let key_id = key.id.clone();
        let outcome = score(signals, truth);
        let informative = outcome.is_informative(self.config.outcome_threshold);
        let composite_score = outcome.composite_score;

        let exemplar_count = {
            let mut canonical = self.memory.write();
            let appended = add(&canonical, key, outcome, &self.config, now);
            let learned = match appended.exemplars.last().cloned() {
                Some(exemplar) => absorb_outcome(&appended, &exemplar, &self.config, now),
                None => appended,
            };
            let count = learned.exemplars.len();
            *canonical = Arc::new(learned);
            count
        };
        self.persist().await;

        self.events.publish(SteeringEvent::ExemplarRecorded {
            key_id: key_id.clone(),
            composite_score,
            informative,
            exemplar_count,
            timestamp: now,
        });
        debug!(%key_id, composite_score, informative, "pipeline run recorded");
        key_id
    }

    /// Attach a user rating to an exemplar and re-learn from it.
    ///
    /// Unknown ids are a silent no-op; returns whether a rating was applied.
    pub async fn rate_exemplar(&self, key_id: &str, rating: f64) -> bool {
        let now = self.clock.now();
        let rated_exemplar = {
            let mut canonical = self.memory.write();
            let rated = rate(&canonical, key_id, rating);
            match rated.exemplar {
                Some(exemplar) => {
                    let learned = absorb_outcome(&rated.memory, &exemplar, &self.config, now);
                    *canonical = Arc::new(learned);
                    Some(exemplar)
                }
                None => None,
            }
        };

        match rated_exemplar {
            Some(exemplar) => {
                self.persist().await;
                self.events.publish(SteeringEvent::ExemplarRated {
                    key_id: key_id.to_string(),
                    rating: exemplar.user_rating.unwrap_or(0.0),
                    timestamp: now,
                });
                true
            }
            None => {
                debug!(%key_id, "rating ignored, no such exemplar");
                false
            }
        }
    }

    /// Steering bias for an incoming query. Neutral when disabled or empty.
    pub fn compute_bias(&self, query: &QueryFeatureVector) -> SteeringBias {
        compute_bias(&self.snapshot(), query, &self.config)
    }

    /// Apply time-decay across the prior table at the injected clock's now.
    pub async fn refresh_decay(&self) {
        let now = self.clock.now();
        let bucket_count = {
            let mut canonical = self.memory.write();
            let next = decay_refresh(&canonical, now, self.config.decay_rate);
            let count = next.priors.len();
            *canonical = Arc::new(next);
            count
        };
        self.persist().await;

        self.events.publish(SteeringEvent::PriorsRefreshed {
            bucket_count,
            decay_rate: self.config.decay_rate,
            timestamp: now,
        });
    }

    /// Export the current memory as a versioned snapshot payload.
    pub fn export_snapshot(&self) -> String {
        encode_snapshot(&self.snapshot())
    }

    /// Replace the current memory from a snapshot payload.
    ///
    /// Corrupt or unknown-version payloads are rejected (`false`) and the
    /// existing state stays untouched.
    pub async fn import_snapshot(&self, payload: &str) -> bool {
        let Some(memory) = decode_snapshot(payload) else {
            return false;
        };

        let exemplar_count = memory.exemplars.len();
        let bucket_count = memory.priors.len();
        self.swap(memory);
        self.persist().await;

        self.events.publish(SteeringEvent::SnapshotImported {
            exemplar_count,
            bucket_count,
            timestamp: self.clock.now(),
        });
        true
    }

    /// Current immutable memory snapshot.
    pub fn snapshot(&self) -> Arc<SteeringMemory> {
        self.memory.read().clone()
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    fn swap(&self, next: SteeringMemory) {
        *self.memory.write() = Arc::new(next);
    }

    async fn persist(&self) {
        let payload = encode_snapshot(&self.snapshot());
        if let Err(e) = self.store.save(MEMORY_STORE_KEY, &payload).await {
            warn!(error = %e, "steering memory not persisted, continuing in-memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ManualClock, QueryDomain, TopologicalSignature};
    use crate::infrastructure::store::FailingStateStore;
    use crate::infrastructure::InMemoryStateStore;
    use chrono::{DateTime, Duration, Utc};

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn service_with(store: Arc<dyn StateStore>) -> (SteeringService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(epoch()));
        let service = SteeringService::new(
            SteeringConfig::default(),
            store,
            SteeringEventBus::with_default_capacity(),
            clock.clone(),
        );
        (service, clock)
    }

    fn strong_signals() -> SignalSnapshot {
        SignalSnapshot::new(
            0.95,
            0.05,
            0.05,
            0.95,
            0.0,
            TopologicalSignature::new(2, 0, 0.3, 0.2),
        )
    }

    fn analysis() -> QueryAnalysis {
        QueryAnalysis::new(QueryDomain::Research, 0.6, 4, 25)
    }

    #[tokio::test]
    async fn test_record_then_rate_round_trip() {
        let (service, _clock) = service_with(Arc::new(InMemoryStateStore::new()));

        let key_id = service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;
        assert_eq!(service.snapshot().exemplars.len(), 1);

        assert!(service.rate_exemplar(&key_id, -0.8).await);
        let exemplar = service.snapshot().find_exemplar(&key_id).cloned().unwrap();
        assert_eq!(exemplar.user_rating, Some(-0.8));
    }

    #[tokio::test]
    async fn test_rate_unknown_id_is_a_no_op() {
        let (service, _clock) = service_with(Arc::new(InMemoryStateStore::new()));
        service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;
        let before = service.snapshot();

        assert!(!service.rate_exemplar("missing", 1.0).await);
        assert_eq!(*service.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_replay_produces_the_same_key_id() {
        let (service, _clock) = service_with(Arc::new(InMemoryStateStore::new()));
        let a = service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(7), None)
            .await;
        let b = service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(7), None)
            .await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_fatal() {
        let (service, _clock) = service_with(Arc::new(FailingStateStore));

        let key_id = service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;
        // The run is remembered in-memory even though the save failed.
        assert!(service.snapshot().find_exemplar(&key_id).is_some());

        service.load().await.unwrap();
        assert!(service.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_load_survives_corrupt_state() {
        let store = Arc::new(InMemoryStateStore::new());
        store.save(MEMORY_STORE_KEY, "garbage{{{").await.unwrap();

        let (service, _clock) = service_with(store);
        service.load().await.unwrap();
        assert!(service.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let (service, _clock) = service_with(Arc::new(InMemoryStateStore::new()));
        for i in 0..3u128 {
            service
                .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(i), None)
                .await;
        }
        let exported = service.export_snapshot();

        let (other, _clock) = service_with(Arc::new(InMemoryStateStore::new()));
        assert!(other.import_snapshot(&exported).await);
        assert_eq!(*other.snapshot(), *service.snapshot());
    }

    #[tokio::test]
    async fn test_bad_import_leaves_state_untouched() {
        let (service, _clock) = service_with(Arc::new(InMemoryStateStore::new()));
        service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;
        let before = service.snapshot();

        assert!(!service.import_snapshot("{\"version\":42}").await);
        assert_eq!(*service.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_persisted_state_reloads() {
        let store = Arc::new(InMemoryStateStore::new());
        let (service, _clock) = service_with(store.clone());
        let key_id = service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;

        let (reloaded, _clock) = service_with(store);
        reloaded.load().await.unwrap();
        assert!(reloaded.snapshot().find_exemplar(&key_id).is_some());
    }

    #[tokio::test]
    async fn test_refresh_decay_uses_injected_clock() {
        let (service, clock) = service_with(Arc::new(InMemoryStateStore::new()));
        service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;
        assert!(!service.snapshot().priors.is_empty());

        // A decade of decay at the default rate empties the table.
        clock.advance(Duration::days(3650));
        service.refresh_decay().await;
        assert!(service.snapshot().priors.is_empty());
    }

    #[tokio::test]
    async fn test_bias_is_neutral_when_disabled() {
        let clock = Arc::new(ManualClock::new(epoch()));
        let service = SteeringService::new(
            SteeringConfig {
                enabled: false,
                ..Default::default()
            },
            Arc::new(InMemoryStateStore::new()),
            SteeringEventBus::with_default_capacity(),
            clock,
        );
        service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;

        let query = QueryFeatureVector::from_analysis(&analysis());
        assert!(service.compute_bias(&query).is_neutral());
    }

    #[tokio::test]
    async fn test_events_are_published_on_mutations() {
        let store = Arc::new(InMemoryStateStore::new());
        let bus = SteeringEventBus::with_default_capacity();
        let clock = Arc::new(ManualClock::new(epoch()));
        let service =
            SteeringService::new(SteeringConfig::default(), store, bus.clone(), clock);
        let mut receiver = bus.subscribe();

        let key_id = service
            .record_pipeline_run(&strong_signals(), &analysis(), Uuid::from_u128(1), None)
            .await;
        service.rate_exemplar(&key_id, 0.5).await;

        assert_eq!(receiver.recv().await.unwrap().event_type(), "exemplar_recorded");
        assert_eq!(receiver.recv().await.unwrap().event_type(), "exemplar_rated");
    }
}

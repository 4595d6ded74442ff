// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain layer for the steering bounded context.

pub mod bias;
pub mod clock;
pub mod config;
pub mod encoding;
pub mod events;
pub mod memory;
pub mod outcome;
pub mod priors;
pub mod signals;

pub use bias::{compute_bias, SteeringBias};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SteeringConfig;
pub use encoding::{encode, BucketId, QueryFeatureVector, SynthesisKey, FEATURE_BUCKETS, FEATURE_DIM};
pub use events::SteeringEvent;
pub use memory::{absorb_outcome, add, decay_refresh, rate, Exemplar, Rated, SteeringMemory};
pub use outcome::{score, SteeringOutcome, TruthAssessment};
pub use priors::{decay_priors, update_priors, PriorBucket, PriorTable};
pub use signals::{QueryAnalysis, QueryDomain, SignalSnapshot, TopologicalSignature, NEUTRAL_SIGNAL};

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the steering bounded context.
//!
//! Published on every memory mutation so observers (stores, dashboards,
//! background learners) can subscribe without the engine carrying implicit
//! reactivity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Steering domain events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SteeringEvent {
    /// A pipeline run was scored and appended to memory.
    ExemplarRecorded {
        key_id: String,
        composite_score: f64,
        informative: bool,
        exemplar_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A user rating was attached to an existing exemplar.
    ExemplarRated {
        key_id: String,
        rating: f64,
        timestamp: DateTime<Utc>,
    },

    /// Time-decay was applied across the prior table.
    PriorsRefreshed {
        bucket_count: usize,
        decay_rate: f64,
        timestamp: DateTime<Utc>,
    },

    /// A snapshot import replaced the in-memory state.
    SnapshotImported {
        exemplar_count: usize,
        bucket_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Memory was hydrated from the persistence store at startup.
    MemoryRestored {
        exemplar_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl SteeringEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SteeringEvent::ExemplarRecorded { timestamp, .. } => *timestamp,
            SteeringEvent::ExemplarRated { timestamp, .. } => *timestamp,
            SteeringEvent::PriorsRefreshed { timestamp, .. } => *timestamp,
            SteeringEvent::SnapshotImported { timestamp, .. } => *timestamp,
            SteeringEvent::MemoryRestored { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            SteeringEvent::ExemplarRecorded { .. } => "exemplar_recorded",
            SteeringEvent::ExemplarRated { .. } => "exemplar_rated",
            SteeringEvent::PriorsRefreshed { .. } => "priors_refreshed",
            SteeringEvent::SnapshotImported { .. } => "snapshot_imported",
            SteeringEvent::MemoryRestored { .. } => "memory_restored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_round_trip() {
        let event = SteeringEvent::ExemplarRecorded {
            key_id: "abc123".to_string(),
            composite_score: 0.42,
            informative: true,
            exemplar_count: 7,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: SteeringEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.event_type(), back.event_type());
    }

    #[test]
    fn test_event_type_tags() {
        let event = SteeringEvent::PriorsRefreshed {
            bucket_count: 3,
            decay_rate: 0.05,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "priors_refreshed");
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Versioned snapshot codec for steering memory.
//!
//! Export produces a self-describing JSON envelope; import rejects unknown or
//! corrupt payloads by returning `None` — the caller's existing state stays
//! untouched, nothing throws.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::SteeringMemory;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    version: u32,
    memory: SteeringMemory,
}

/// Serialize a memory snapshot into its versioned wire form.
pub fn encode_snapshot(memory: &SteeringMemory) -> String {
    let envelope = SnapshotEnvelope {
        version: SNAPSHOT_VERSION,
        memory: memory.clone(),
    };
    // SteeringMemory contains only JSON-representable types.
    serde_json::to_string(&envelope).unwrap_or_else(|e| {
        warn!(error = %e, "snapshot serialization failed, exporting empty envelope");
        format!("{{\"version\":{SNAPSHOT_VERSION},\"memory\":{{\"exemplars\":[],\"priors\":{{\"buckets\":{{}}}}}}}}")
    })
}

/// Parse a snapshot back into a memory, or reject it.
pub fn decode_snapshot(payload: &str) -> Option<SteeringMemory> {
    let envelope: SnapshotEnvelope = match serde_json::from_str(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "rejecting corrupt steering snapshot");
            return None;
        }
    };

    if envelope.version != SNAPSHOT_VERSION {
        warn!(
            version = envelope.version,
            expected = SNAPSHOT_VERSION,
            "rejecting steering snapshot with unknown version"
        );
        return None;
    }

    Some(envelope.memory)
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer for the steering bounded context.

pub mod event_bus;
pub mod sled_store;
pub mod snapshot;
pub mod store;

pub use event_bus::{SteeringEventBus, SteeringEventReceiver};
pub use sled_store::SledStateStore;
pub use snapshot::{decode_snapshot, encode_snapshot, SNAPSHOT_VERSION};
pub use store::{InMemoryStateStore, StateStore};

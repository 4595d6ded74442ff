// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory event bus for steering domain events.
//!
//! Backed by a tokio broadcast channel; events are lost on restart. Slow
//! subscribers lag rather than block the publisher.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::SteeringEvent;

/// Broadcast-based pub/sub for [`SteeringEvent`]s.
#[derive(Clone)]
pub struct SteeringEventBus {
    sender: Arc<broadcast::Sender<SteeringEvent>>,
}

impl SteeringEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers. Publishing never fails; with no
    /// subscribers the event is simply dropped.
    pub fn publish(&self, event: SteeringEvent) {
        debug!(event_type = event.event_type(), "publishing steering event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> SteeringEventReceiver {
        SteeringEventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SteeringEventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

pub struct SteeringEventReceiver {
    receiver: broadcast::Receiver<SteeringEvent>,
}

impl SteeringEventReceiver {
    pub async fn recv(&mut self) -> Option<SteeringEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "steering event receiver lagged");
                }
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<SteeringEvent> {
        self.receiver.try_recv().ok()
    }
}

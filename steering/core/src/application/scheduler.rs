// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Maintenance scheduler — explicit timer-driven decay refresh.
//!
//! Background learning used to re-enter the loop from an implicit debounce
//! timer; here the timer is an injected port so debounce and minimum-interval
//! logic run under test without real wall-clock delays.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::steering_service::SteeringService;
use crate::domain::Clock;

/// Timer port. Production waits on the tokio runtime; tests return instantly.
#[async_trait]
pub trait TimerService: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Tokio-backed timer.
pub struct TokioTimer;

#[async_trait]
impl TimerService for TokioTimer {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Debounced, rate-limited driver for [`SteeringService::refresh_decay`].
pub struct MaintenanceScheduler {
    service: Arc<SteeringService>,
    timer: Arc<dyn TimerService>,
    clock: Arc<dyn Clock>,
    /// Quiet period before a requested refresh actually runs.
    debounce: Duration,
    /// Minimum spacing between two refreshes.
    min_interval: chrono::Duration,
    last_refresh: Mutex<Option<chrono::DateTime<chrono::Utc>>>,
}

impl MaintenanceScheduler {
    pub fn new(
        service: Arc<SteeringService>,
        timer: Arc<dyn TimerService>,
        clock: Arc<dyn Clock>,
        debounce: Duration,
        min_interval: chrono::Duration,
    ) -> Self {
        Self {
            service,
            timer,
            clock,
            debounce,
            min_interval,
            last_refresh: Mutex::new(None),
        }
    }

    /// Request a decay refresh.
    ///
    /// Waits out the debounce window, then refreshes unless another refresh
    /// already ran within `min_interval`. Returns whether a refresh ran.
    /// Dropping the returned future before it completes cancels the request.
    pub async fn request_refresh(&self) -> bool {
        self.timer.wait(self.debounce).await;

        let now = self.clock.now();
        {
            let mut last = self.last_refresh.lock();
            if let Some(previous) = *last {
                if now - previous < self.min_interval {
                    debug!("decay refresh skipped, min interval not elapsed");
                    return false;
                }
            }
            *last = Some(now);
        }

        self.service.refresh_decay().await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ManualClock, SteeringConfig};
    use crate::infrastructure::{InMemoryStateStore, SteeringEventBus};
    use chrono::DateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Timer that never sleeps but counts how often it was asked to.
    struct InstantTimer {
        waits: AtomicUsize,
    }

    impl InstantTimer {
        fn new() -> Self {
            Self {
                waits: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TimerService for InstantTimer {
        async fn wait(&self, _duration: Duration) {
            self.waits.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn build() -> (MaintenanceScheduler, Arc<ManualClock>, Arc<InstantTimer>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let timer = Arc::new(InstantTimer::new());
        let service = Arc::new(SteeringService::new(
            SteeringConfig::default(),
            Arc::new(InMemoryStateStore::new()),
            SteeringEventBus::with_default_capacity(),
            clock.clone(),
        ));
        let scheduler = MaintenanceScheduler::new(
            service,
            timer.clone(),
            clock.clone(),
            Duration::from_secs(30),
            chrono::Duration::minutes(10),
        );
        (scheduler, clock, timer)
    }

    #[tokio::test]
    async fn test_first_request_runs() {
        let (scheduler, _clock, timer) = build();
        assert!(scheduler.request_refresh().await);
        assert_eq!(timer.waits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_min_interval_suppresses_back_to_back_refreshes() {
        let (scheduler, clock, _timer) = build();
        assert!(scheduler.request_refresh().await);
        assert!(!scheduler.request_refresh().await);

        clock.advance(chrono::Duration::minutes(11));
        assert!(scheduler.request_refresh().await);
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application layer for the steering bounded context.

pub mod scheduler;
pub mod steering_service;

pub use scheduler::{MaintenanceScheduler, TimerService, TokioTimer};
pub use steering_service::{SteeringService, MEMORY_STORE_KEY};

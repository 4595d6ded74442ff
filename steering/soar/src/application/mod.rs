// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application layer for the SOAR bounded context.

pub mod controller;

pub use controller::{SessionError, SoarController};

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Persistence port for steering state.
//!
//! The engine treats storage as an abstract key-value collaborator; a failed
//! load or save means "memory unavailable", never a fatal error.

use async_trait::async_trait;
use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Abstract key-value store for serialized steering state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the serialized payload stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Persist `payload` under `key`, replacing any previous value.
    async fn save(&self, key: &str, payload: &str) -> Result<()>;

    /// Remove whatever is stored under `key`.
    async fn clear(&self, key: &str) -> Result<()>;
}

/// In-memory implementation of [`StateStore`] for tests and ephemeral runs.
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, payload: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// A store that fails every operation; used to exercise the
/// "storage unavailable is not fatal" path in tests.
#[cfg(test)]
pub struct FailingStateStore;

#[cfg(test)]
#[async_trait]
impl StateStore for FailingStateStore {
    async fn load(&self, _key: &str) -> Result<Option<String>> {
        anyhow::bail!("store offline")
    }

    async fn save(&self, _key: &str, _payload: &str) -> Result<()> {
        anyhow::bail!("store offline")
    }

    async fn clear(&self, _key: &str) -> Result<()> {
        anyhow::bail!("store offline")
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Sled-backed implementation of the [`StateStore`] port.
//!
//! sled performs its own I/O buffering; `flush_async` after each write keeps
//! the snapshot durable across process restarts.

use async_trait::async_trait;
use anyhow::{Context, Result};
use std::path::Path;

use super::store::StateStore;

pub struct SledStateStore {
    db: sled::Db,
}

impl SledStateStore {
    /// Open (or create) a sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("opening sled store at {}", path.as_ref().display()))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl StateStore for SledStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let value = self.db.get(key).context("reading steering state")?;
        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec())
                    .context("steering state is not valid UTF-8")?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, payload: &str) -> Result<()> {
        self.db
            .insert(key, payload.as_bytes())
            .context("writing steering state")?;
        self.db.flush_async().await.context("flushing sled store")?;
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.db.remove(key).context("clearing steering state")?;
        self.db.flush_async().await.context("flushing sled store")?;
        Ok(())
    }
}

//! Durable key/value slots behind a swappable capability.
//!
//! The journal only ever needs `load`/`save` of whole string values, so the
//! SQLite database and the in-memory fake both sit behind [`KeyValueStore`].

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::Result;
use async_trait::async_trait;

use crate::db::Database;

mod repository;

pub use repository::{
    PersistedState, StateRepository, CURRENT_SESSION_KEY, HISTORY_KEY, STATS_KEY,
};

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
impl KeyValueStore for Database {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.put_value(key, value).await
    }
}

/// Process-local store. Nothing survives the process; used for tests and
/// for embedding the controller without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.guard().get(key).cloned()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.guard().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

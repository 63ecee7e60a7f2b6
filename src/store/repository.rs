use std::sync::Arc;

use anyhow::{Context, Result};

use super::KeyValueStore;
use crate::models::{LifetimeStats, SessionEntry};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const CURRENT_SESSION_KEY: &str = "pradakshina_current_session";
pub const STATS_KEY: &str = "pradakshina_stats";
pub const HISTORY_KEY: &str = "pradakshina_history";

/// Everything restored from the store at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub current_count: u64,
    pub total_lifetime_count: u64,
    pub history: Vec<SessionEntry>,
}

/// The three journal slots on top of a [`KeyValueStore`].
///
/// Reads never fail: a missing, unreadable or malformed slot comes back as
/// its empty default. Writes report errors and leave retrying to nobody.
#[derive(Clone)]
pub struct StateRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StateRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> PersistedState {
        let state = PersistedState {
            current_count: self.load_current_count().await,
            total_lifetime_count: self.load_lifetime_stats().await.total_rounds,
            history: self.load_history().await,
        };
        log_info!(
            "Restored journal: current={} lifetime={} entries={}",
            state.current_count,
            state.total_lifetime_count,
            state.history.len()
        );
        state
    }

    pub async fn load_current_count(&self) -> u64 {
        match self.read(CURRENT_SESSION_KEY).await {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log_warn!("Ignoring malformed current session value {raw:?}");
                0
            }),
            None => 0,
        }
    }

    pub async fn load_lifetime_stats(&self) -> LifetimeStats {
        self.read_json(STATS_KEY).await.unwrap_or_default()
    }

    /// Stored history with zero-count entries dropped.
    pub async fn load_history(&self) -> Vec<SessionEntry> {
        let mut history: Vec<SessionEntry> =
            self.read_json(HISTORY_KEY).await.unwrap_or_default();
        let stored = history.len();
        history.retain(|entry| entry.count > 0);
        if history.len() < stored {
            log_warn!("Dropped {} empty history entries", stored - history.len());
        }
        history
    }

    pub async fn save_current_count(&self, count: u64) -> Result<()> {
        self.store
            .save(CURRENT_SESSION_KEY, &count.to_string())
            .await
            .context("failed to persist current session")
    }

    pub async fn save_lifetime_total(&self, total_rounds: u64) -> Result<()> {
        let serialized = serde_json::to_string(&LifetimeStats { total_rounds })?;
        self.store
            .save(STATS_KEY, &serialized)
            .await
            .context("failed to persist lifetime stats")
    }

    pub async fn save_history(&self, history: &[SessionEntry]) -> Result<()> {
        let serialized = serde_json::to_string(history)?;
        self.store
            .save(HISTORY_KEY, &serialized)
            .await
            .context("failed to persist history")
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.load(key).await {
            Ok(value) => value,
            Err(err) => {
                log_warn!("Failed to read {key}: {err:#}");
                None
            }
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log_warn!("Ignoring malformed {key}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn repo_with(values: Vec<(&str, &str)>) -> StateRepository {
        StateRepository::new(Arc::new(MemoryStore::with_values(values)))
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn load(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }

        async fn save(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let state = repo_with(vec![]).load().await;
        assert_eq!(state, PersistedState::default());
    }

    #[tokio::test]
    async fn malformed_slots_load_as_defaults() {
        let state = repo_with(vec![
            (CURRENT_SESSION_KEY, "twelve"),
            (STATS_KEY, "{not json"),
            (HISTORY_KEY, r#"{"id":"1"}"#),
        ])
        .load()
        .await;

        assert_eq!(state, PersistedState::default());
    }

    #[tokio::test]
    async fn slots_are_independent() {
        let state = repo_with(vec![
            (CURRENT_SESSION_KEY, " 9 "),
            (STATS_KEY, "garbage"),
            (HISTORY_KEY, r#"[{"id":"5","count":5,"timestamp":5}]"#),
        ])
        .load()
        .await;

        assert_eq!(state.current_count, 9);
        assert_eq!(state.total_lifetime_count, 0);
        assert_eq!(state.history.len(), 1);
    }

    #[tokio::test]
    async fn zero_count_entries_are_dropped_on_load() {
        let history = repo_with(vec![(
            HISTORY_KEY,
            r#"[{"id":"1","count":0,"timestamp":1},{"id":"2","count":4,"timestamp":2}]"#,
        )])
        .load_history()
        .await;

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "2");
    }

    #[tokio::test]
    async fn unreadable_store_loads_defaults_and_reports_write_errors() {
        let repo = StateRepository::new(Arc::new(BrokenStore));
        assert_eq!(repo.load().await, PersistedState::default());
        assert!(repo.save_current_count(1).await.is_err());
    }

    #[tokio::test]
    async fn writes_use_documented_formats() {
        let store = Arc::new(MemoryStore::new());
        let repo = StateRepository::new(store.clone());

        repo.save_current_count(21).await.unwrap();
        repo.save_lifetime_total(108).await.unwrap();
        repo.save_history(&[SessionEntry {
            id: "1".into(),
            count: 108,
            timestamp: 1,
            note: Some("Manual Entry".into()),
            insight: None,
        }])
        .await
        .unwrap();

        assert_eq!(store.get(CURRENT_SESSION_KEY).as_deref(), Some("21"));
        assert_eq!(store.get(STATS_KEY).as_deref(), Some(r#"{"totalRounds":108}"#));
        assert_eq!(
            store.get(HISTORY_KEY).as_deref(),
            Some(r#"[{"id":"1","count":108,"timestamp":1,"note":"Manual Entry"}]"#)
        );
    }
}

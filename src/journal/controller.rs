use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::{error, info};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::{
    insight::InsightGenerator,
    models::{JournalStats, SessionEntry, MANUAL_ENTRY_NOTE},
    settings::ShareSettings,
    share::{parse_count, share_link, Location, ShareChannel, ShareData, ShareOutcome},
    store::StateRepository,
};

use super::{GenerationStatus, JournalState};

const EVENT_CAPACITY: usize = 64;

/// Everything a front end needs to draw the main screen.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalSnapshot {
    pub current_count: u64,
    pub total_lifetime_count: u64,
    pub generation: GenerationStatus,
    pub last_insight: Option<String>,
    pub show_insight: bool,
    pub stats: JournalStats,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JournalEvent {
    /// A tap landed; front ends flash the counter.
    Counted { count: u64 },
    CurrentReset,
    GenerationChanged { status: GenerationStatus },
    SessionSaved { entry: SessionEntry },
    /// Only sent for live saves, never for manual entries.
    InsightReady { insight: String },
    HistoryCleared,
    Notice { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Recorded(SessionEntry),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NothingToSave,
    InvalidCount,
    /// An insight is already being generated for another save.
    Busy,
}

impl ActionOutcome {
    pub fn entry(&self) -> Option<&SessionEntry> {
        match self {
            ActionOutcome::Recorded(entry) => Some(entry),
            ActionOutcome::Skipped(_) => None,
        }
    }
}

/// Runs every user action against the journal state.
///
/// Each mutation is written through to the repository before the call
/// returns. Write failures are logged and otherwise ignored; the in-memory
/// state stays authoritative for the rest of the process.
#[derive(Clone)]
pub struct JournalController {
    state: Arc<Mutex<JournalState>>,
    repo: StateRepository,
    insight: InsightGenerator,
    events: broadcast::Sender<JournalEvent>,
}

impl JournalController {
    pub fn new(initial: JournalState, repo: StateRepository, insight: InsightGenerator) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(initial)),
            repo,
            insight,
            events,
        }
    }

    /// Restore the persisted journal and build a controller around it.
    pub async fn load(repo: StateRepository, insight: InsightGenerator) -> Self {
        let persisted = repo.load().await;
        Self::new(JournalState::from_persisted(persisted), repo, insight)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JournalEvent> {
        self.events.subscribe()
    }

    pub async fn get_state(&self) -> JournalState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> JournalSnapshot {
        let guard = self.state.lock().await;
        JournalSnapshot {
            current_count: guard.current_count,
            total_lifetime_count: guard.total_lifetime_count,
            generation: guard.generation,
            last_insight: guard.last_insight.clone(),
            show_insight: guard.show_insight,
            stats: guard.stats(),
        }
    }

    pub async fn history(&self) -> Vec<SessionEntry> {
        self.state.lock().await.history.clone()
    }

    pub async fn increment(&self) -> u64 {
        let count = {
            let mut state = self.state.lock().await;
            let count = state.increment();
            self.persist_current(count).await;
            count
        };
        self.emit(JournalEvent::Counted { count });
        count
    }

    /// Discard the unsaved session. Callers confirm with the user first.
    pub async fn reset_current(&self) -> bool {
        let reset = {
            let mut state = self.state.lock().await;
            let reset = state.reset_current();
            if reset {
                self.persist_current(0).await;
            }
            reset
        };
        if reset {
            self.emit(JournalEvent::CurrentReset);
        }
        reset
    }

    pub async fn save_session(&self) -> ActionOutcome {
        let count = {
            let mut state = self.state.lock().await;
            if state.is_generating() {
                return ActionOutcome::Skipped(SkipReason::Busy);
            }
            if state.current_count == 0 {
                return ActionOutcome::Skipped(SkipReason::NothingToSave);
            }
            state.begin_generation();
            state.current_count
        };
        self.emit_generation(GenerationStatus::Pending);

        let insight = self.insight.generate(count).await;

        let entry = {
            let mut state = self.state.lock().await;
            let entry = state.commit_session(count, now_ms(), insight.clone());
            state.finish_generation();
            if entry.is_some() {
                self.persist_all(&state).await;
            }
            entry
        };
        self.emit_generation(GenerationStatus::Idle);

        match entry {
            Some(entry) => {
                info!("Saved session {} with {} rounds", entry.id, entry.count);
                self.emit(JournalEvent::SessionSaved {
                    entry: entry.clone(),
                });
                self.emit(JournalEvent::InsightReady { insight });
                ActionOutcome::Recorded(entry)
            }
            None => ActionOutcome::Skipped(SkipReason::NothingToSave),
        }
    }

    /// Record rounds completed away from the counter. Succeeds silently: the
    /// insight is stored on the entry but not surfaced.
    pub async fn manual_add(&self, raw: &str) -> ActionOutcome {
        let Some(count) = parse_count(raw) else {
            return ActionOutcome::Skipped(SkipReason::InvalidCount);
        };

        {
            let mut state = self.state.lock().await;
            if state.is_generating() {
                return ActionOutcome::Skipped(SkipReason::Busy);
            }
            state.begin_generation();
        }
        self.emit_generation(GenerationStatus::Pending);

        let insight = self.insight.generate(count).await;

        let entry = {
            let mut state = self.state.lock().await;
            let entry = state.record_entry(
                count,
                now_ms(),
                Some(MANUAL_ENTRY_NOTE.to_string()),
                Some(insight),
            );
            state.finish_generation();
            if entry.is_some() {
                self.persist_history(&state).await;
            }
            entry
        };
        self.emit_generation(GenerationStatus::Idle);

        match entry {
            Some(entry) => {
                info!("Added manual entry {} with {} rounds", entry.id, entry.count);
                self.emit(JournalEvent::SessionSaved {
                    entry: entry.clone(),
                });
                ActionOutcome::Recorded(entry)
            }
            None => ActionOutcome::Skipped(SkipReason::InvalidCount),
        }
    }

    /// Drop all history and the lifetime total. Callers confirm first.
    pub async fn clear_history(&self) {
        {
            let mut state = self.state.lock().await;
            state.clear_history();
            self.persist_history(&state).await;
        }
        info!("History cleared");
        self.emit(JournalEvent::HistoryCleared);
    }

    pub async fn dismiss_insight(&self) {
        self.state.lock().await.dismiss_insight();
    }

    /// Seed the counter from a shared link's `count` parameter, then strip
    /// the parameter from `location` so the import happens once.
    pub async fn import_from_location(&self, location: &mut Location) -> Option<u64> {
        let count = location.shared_count()?;
        {
            let mut state = self.state.lock().await;
            state.import_count(count);
            self.persist_current(count).await;
        }
        location.strip_count();

        info!("Imported shared session with {count} rounds");
        self.emit(JournalEvent::Notice {
            message: format!("Imported shared session: {count} rounds"),
        });
        Some(count)
    }

    pub async fn share(
        &self,
        settings: &ShareSettings,
        channel: &dyn ShareChannel,
    ) -> Result<(ShareData, ShareOutcome)> {
        let current_count = self.state.lock().await.current_count;
        let data = ShareData::new(settings, current_count)?;
        let outcome = share_link(channel, &data).await;

        if let Some(message) = outcome.notice() {
            self.emit(JournalEvent::Notice {
                message: message.to_string(),
            });
        }
        Ok((data, outcome))
    }

    async fn persist_current(&self, count: u64) {
        if let Err(err) = self.repo.save_current_count(count).await {
            error!("{err:#}");
        }
    }

    async fn persist_history(&self, state: &JournalState) {
        if let Err(err) = self.repo.save_history(&state.history).await {
            error!("{err:#}");
        }
        if let Err(err) = self.repo.save_lifetime_total(state.total_lifetime_count).await {
            error!("{err:#}");
        }
    }

    async fn persist_all(&self, state: &JournalState) {
        self.persist_history(state).await;
        self.persist_current(state.current_count).await;
    }

    fn emit_generation(&self, status: GenerationStatus) {
        self.emit(JournalEvent::GenerationChanged { status });
    }

    fn emit(&self, event: JournalEvent) {
        // No subscribers is the normal case for one-shot CLI runs.
        let _ = self.events.send(event);
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

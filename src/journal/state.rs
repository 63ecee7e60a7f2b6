use serde::{Deserialize, Serialize};

use crate::models::{next_entry_id, JournalStats, SessionEntry};
use crate::store::PersistedState;

/// Whether an insight request is in flight. Saving is refused while `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GenerationStatus {
    Idle,
    Pending,
}

impl Default for GenerationStatus {
    fn default() -> Self {
        GenerationStatus::Idle
    }
}

/// Counter, lifetime total and history, plus what the front end shows.
///
/// `total_lifetime_count` always equals the sum of `history` counts after a
/// mutation made through these methods.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalState {
    pub current_count: u64,
    pub total_lifetime_count: u64,
    pub history: Vec<SessionEntry>,
    pub generation: GenerationStatus,
    /// Insight of the most recent live save, until reset.
    pub last_insight: Option<String>,
    /// Set by a live save so the front end can pop the insight up.
    pub show_insight: bool,
}

impl JournalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_persisted(persisted: PersistedState) -> Self {
        Self {
            current_count: persisted.current_count,
            total_lifetime_count: persisted.total_lifetime_count,
            history: persisted.history,
            ..Self::default()
        }
    }

    pub fn increment(&mut self) -> u64 {
        self.current_count = self.current_count.saturating_add(1);
        self.current_count
    }

    /// Discard unsaved rounds. Returns false when there was nothing to discard.
    pub fn reset_current(&mut self) -> bool {
        if self.current_count == 0 {
            return false;
        }
        self.current_count = 0;
        self.last_insight = None;
        self.show_insight = false;
        true
    }

    pub fn import_count(&mut self, count: u64) {
        self.current_count = count;
    }

    pub fn is_generating(&self) -> bool {
        self.generation == GenerationStatus::Pending
    }

    pub fn begin_generation(&mut self) {
        self.generation = GenerationStatus::Pending;
    }

    pub fn finish_generation(&mut self) {
        self.generation = GenerationStatus::Idle;
    }

    /// Append an entry and fold its count into the lifetime total.
    /// Zero counts, and counts the total cannot hold, are refused.
    pub fn record_entry(
        &mut self,
        count: u64,
        timestamp: i64,
        note: Option<String>,
        insight: Option<String>,
    ) -> Option<SessionEntry> {
        if count == 0 {
            return None;
        }
        let total = self.total_lifetime_count.checked_add(count)?;

        let entry = SessionEntry {
            id: next_entry_id(&self.history, timestamp),
            count,
            timestamp,
            note,
            insight,
        };
        self.history.push(entry.clone());
        self.total_lifetime_count = total;
        Some(entry)
    }

    /// Commit `count` rounds of the live session to history.
    ///
    /// Only the committed rounds leave the counter; taps that landed while
    /// the insight was being generated stay on it.
    pub fn commit_session(
        &mut self,
        count: u64,
        timestamp: i64,
        insight: String,
    ) -> Option<SessionEntry> {
        let entry = self.record_entry(count, timestamp, None, Some(insight.clone()))?;
        self.current_count = self.current_count.saturating_sub(count);
        self.last_insight = Some(insight);
        self.show_insight = true;
        Some(entry)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.total_lifetime_count = 0;
    }

    pub fn dismiss_insight(&mut self) {
        self.show_insight = false;
    }

    /// Sum of history counts, or `None` if it does not fit in a `u64`.
    pub fn history_total(&self) -> Option<u64> {
        self.history
            .iter()
            .try_fold(0u64, |total, entry| total.checked_add(entry.count))
    }

    pub fn is_consistent(&self) -> bool {
        self.history_total() == Some(self.total_lifetime_count)
    }

    pub fn stats(&self) -> JournalStats {
        JournalStats::from_history(self.total_lifetime_count, &self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MANUAL_ENTRY_NOTE;

    #[test]
    fn increments_accumulate() {
        let mut state = JournalState::new();
        state.import_count(4);
        for _ in 0..6 {
            state.increment();
        }
        assert_eq!(state.current_count, 10);
    }

    #[test]
    fn reset_clears_count_and_pending_insight() {
        let mut state = JournalState::new();
        assert!(!state.reset_current());

        state.increment();
        state.last_insight = Some("old".into());
        state.show_insight = true;
        assert!(state.reset_current());
        assert_eq!(state.current_count, 0);
        assert!(state.last_insight.is_none());
        assert!(!state.show_insight);
    }

    #[test]
    fn commit_moves_count_into_history() {
        let mut state = JournalState::new();
        state.import_count(5);

        let entry = state.commit_session(5, 1_000, "Walk on.".into()).unwrap();
        assert_eq!(entry.count, 5);
        assert_eq!(entry.id, "1000");
        assert_eq!(entry.insight.as_deref(), Some("Walk on."));
        assert_eq!(state.current_count, 0);
        assert_eq!(state.total_lifetime_count, 5);
        assert_eq!(state.last_insight.as_deref(), Some("Walk on."));
        assert!(state.show_insight);
        assert!(state.is_consistent());
    }

    #[test]
    fn commit_keeps_taps_made_after_capture() {
        let mut state = JournalState::new();
        state.import_count(5);
        state.increment();
        state.increment();

        state.commit_session(5, 1, "x".into()).unwrap();
        assert_eq!(state.current_count, 2);
        assert_eq!(state.total_lifetime_count, 5);
    }

    #[test]
    fn zero_count_is_never_recorded() {
        let mut state = JournalState::new();
        assert!(state.record_entry(0, 1, None, None).is_none());
        assert!(state.commit_session(0, 1, "x".into()).is_none());
        assert!(state.history.is_empty());
        assert!(!state.show_insight);
    }

    #[test]
    fn identical_records_are_not_deduplicated() {
        let mut state = JournalState::new();
        let a = state
            .record_entry(108, 50, Some(MANUAL_ENTRY_NOTE.into()), None)
            .unwrap();
        let b = state
            .record_entry(108, 50, Some(MANUAL_ENTRY_NOTE.into()), None)
            .unwrap();

        assert_eq!(state.history.len(), 2);
        assert_ne!(a.id, b.id);
        assert_eq!(state.total_lifetime_count, 216);
    }

    #[test]
    fn save_after_maximal_stored_id_gets_fresh_id() {
        let mut state = JournalState::from_persisted(PersistedState {
            current_count: 1,
            total_lifetime_count: 2,
            history: vec![SessionEntry {
                id: i64::MAX.to_string(),
                count: 2,
                timestamp: 0,
                note: None,
                insight: None,
            }],
        });

        let entry = state.commit_session(1, 500, "x".into()).unwrap();
        assert_eq!(entry.id, "500-1");
        assert_eq!(state.total_lifetime_count, 3);
        assert!(state.is_consistent());
    }

    #[test]
    fn count_that_overflows_total_is_refused() {
        let mut state = JournalState::new();
        state.record_entry(u64::MAX - 1, 1, None, None).unwrap();

        assert!(state.record_entry(2, 2, None, None).is_none());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.total_lifetime_count, u64::MAX - 1);
        assert!(state.is_consistent());
    }

    #[test]
    fn clear_empties_history_and_total() {
        let mut state = JournalState::new();
        state.record_entry(3, 1, None, None);
        state.record_entry(7, 2, None, None);
        state.import_count(2);

        state.clear_history();
        assert!(state.history.is_empty());
        assert_eq!(state.total_lifetime_count, 0);
        assert_eq!(state.current_count, 2);
        assert!(state.is_consistent());
    }

    #[test]
    fn invariant_holds_across_mixed_sequences() {
        let mut state = JournalState::new();
        let mut clock = 0;
        for step in 0..40u64 {
            clock += 1;
            match step % 5 {
                0 | 1 => {
                    state.increment();
                    let count = state.current_count;
                    state.commit_session(count, clock, "i".into());
                }
                2 => {
                    state.record_entry(step + 1, clock, Some(MANUAL_ENTRY_NOTE.into()), None);
                }
                3 if step % 3 == 0 => state.clear_history(),
                _ => {}
            }
            assert!(state.is_consistent(), "broken after step {step}");
        }
    }
}

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::SessionEntry;

/// Persisted lifetime record. Only `totalRounds` is stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeStats {
    #[serde(default)]
    pub total_rounds: u64,
}

/// Read-only summary derived from history.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub total_rounds: u64,
    pub sessions_completed: usize,
    pub last_session_date: Option<DateTime<Utc>>,
}

impl JournalStats {
    pub fn from_history(total_rounds: u64, history: &[SessionEntry]) -> Self {
        let last_session_date = history
            .iter()
            .map(|entry| entry.timestamp)
            .max()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Self {
            total_rounds,
            sessions_completed: history.len(),
            last_session_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_stats_tolerates_missing_total() {
        let stats: LifetimeStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats.total_rounds, 0);

        let stats: LifetimeStats =
            serde_json::from_str(r#"{"totalRounds":12,"sessionsCompleted":3}"#).unwrap();
        assert_eq!(stats.total_rounds, 12);
    }

    #[test]
    fn summary_uses_latest_timestamp() {
        let history = vec![
            SessionEntry {
                id: "1".into(),
                count: 3,
                timestamp: 1_000,
                note: None,
                insight: None,
            },
            SessionEntry {
                id: "2".into(),
                count: 4,
                timestamp: 5_000,
                note: None,
                insight: None,
            },
        ];

        let stats = JournalStats::from_history(7, &history);
        assert_eq!(stats.sessions_completed, 2);
        assert_eq!(
            stats.last_session_date.map(|dt| dt.timestamp_millis()),
            Some(5_000)
        );
    }

    #[test]
    fn empty_history_has_no_last_session() {
        let stats = JournalStats::from_history(0, &[]);
        assert_eq!(stats.sessions_completed, 0);
        assert!(stats.last_session_date.is_none());
    }
}

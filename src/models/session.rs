use serde::{Deserialize, Serialize};

/// Note attached to entries added by hand rather than counted live.
pub const MANUAL_ENTRY_NOTE: &str = "Manual Entry";

/// A completed, recorded round of practice. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub id: String,
    pub count: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

impl SessionEntry {
    pub fn is_manual(&self) -> bool {
        self.note.as_deref() == Some(MANUAL_ENTRY_NOTE)
    }
}

/// Allocate an id for an entry created at `now_ms`.
///
/// Ids are the creation millisecond in decimal. When the newest entry already
/// holds that millisecond (or a later one, after a clock step backwards) the
/// id is bumped past it so ids stay unique and sort by recency. If there is
/// no room left to bump, the history length is appended instead.
pub fn next_entry_id(history: &[SessionEntry], now_ms: i64) -> String {
    let newest = history
        .iter()
        .filter_map(|entry| entry.id.parse::<i64>().ok())
        .max();

    match newest {
        Some(newest) if newest >= now_ms => match newest.checked_add(1) {
            Some(next) => next.to_string(),
            None => format!("{now_ms}-{}", history.len()),
        },
        _ => now_ms.to_string(),
    }
}

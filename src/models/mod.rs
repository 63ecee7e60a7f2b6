pub mod session;
pub mod stats;

pub use session::{next_entry_id, SessionEntry, MANUAL_ENTRY_NOTE};
pub use stats::{JournalStats, LifetimeStats};

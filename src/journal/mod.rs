pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{ActionOutcome, JournalController, JournalEvent, JournalSnapshot, SkipReason};
pub use state::{GenerationStatus, JournalState};

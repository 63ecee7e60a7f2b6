//! Terminal front end for the journal controller.
//!
//! Each handler renders to `out` so the CLI writes to stdout and tests
//! capture into a buffer. Destructive actions ask through `confirm` first.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};

use crate::{
    models::SessionEntry,
    settings::ShareSettings,
    share::{Location, ShareChannel},
};

use super::{ActionOutcome, JournalController, SkipReason};

pub const RESET_PROMPT: &str = "Reset current session without saving?";
pub const CLEAR_PROMPT: &str =
    "Are you sure? This will delete all history and reset the lifetime counter.";

/// Ask a yes/no question; anything but `y`/`yes` is a no.
pub fn prompt_confirm(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    question: &str,
) -> Result<bool> {
    write!(out, "{question} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub async fn status(controller: &JournalController, json: bool, out: &mut dyn Write) -> Result<()> {
    let snapshot = controller.get_snapshot().await;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
        return Ok(());
    }

    writeln!(out, "Current Session: {}", snapshot.current_count)?;
    writeln!(out, "Lifetime Rounds: {}", snapshot.total_lifetime_count)?;
    writeln!(out, "Sessions:        {}", snapshot.stats.sessions_completed)?;
    if let Some(last) = snapshot.stats.last_session_date {
        writeln!(
            out,
            "Last Session:    {}",
            last.with_timezone(&Local).format("%Y-%m-%d")
        )?;
    }
    Ok(())
}

pub async fn tap(controller: &JournalController, times: u32, out: &mut dyn Write) -> Result<()> {
    let mut count = controller.get_snapshot().await.current_count;
    for _ in 0..times {
        count = controller.increment().await;
    }
    writeln!(out, "{count}")?;
    Ok(())
}

pub async fn reset(
    controller: &JournalController,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
    out: &mut dyn Write,
) -> Result<()> {
    if controller.get_snapshot().await.current_count == 0 {
        writeln!(out, "Nothing to reset.")?;
        return Ok(());
    }
    if !confirm(RESET_PROMPT)? {
        return Ok(());
    }
    if controller.reset_current().await {
        writeln!(out, "Current session reset.")?;
    }
    Ok(())
}

pub async fn save(controller: &JournalController, out: &mut dyn Write) -> Result<()> {
    match controller.save_session().await {
        ActionOutcome::Recorded(entry) => {
            writeln!(out, "Session Recorded: {} rounds", entry.count)?;
            writeln!(out, "Your Pradakshina has been added to the path.")?;
            if let Some(insight) = &entry.insight {
                writeln!(out)?;
                writeln!(out, "  \"{insight}\"")?;
            }
            controller.dismiss_insight().await;
        }
        ActionOutcome::Skipped(reason) => writeln!(out, "{}", skip_message(reason))?,
    }
    Ok(())
}

pub async fn add(controller: &JournalController, value: &str, out: &mut dyn Write) -> Result<()> {
    match controller.manual_add(value).await {
        ActionOutcome::Recorded(entry) => writeln!(out, "Added {} rounds.", entry.count)?,
        ActionOutcome::Skipped(reason) => writeln!(out, "{}", skip_message(reason))?,
    }
    Ok(())
}

pub async fn history(
    controller: &JournalController,
    json: bool,
    limit: Option<usize>,
    out: &mut dyn Write,
) -> Result<()> {
    let entries = controller.history().await;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(out, "No sessions recorded yet.")?;
        writeln!(out, "Begin your first Pradakshina.")?;
        return Ok(());
    }

    let newest_first = entries.iter().rev().take(limit.unwrap_or(usize::MAX));
    for entry in newest_first {
        write_entry(out, entry)?;
    }
    Ok(())
}

fn write_entry(out: &mut dyn Write, entry: &SessionEntry) -> Result<()> {
    let date = Local
        .timestamp_millis_opt(entry.timestamp)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string());

    write!(out, "{:>6} rounds  {date}", entry.count)?;
    if let Some(note) = &entry.note {
        write!(out, "  ({note})")?;
    }
    writeln!(out)?;
    if let Some(insight) = &entry.insight {
        writeln!(out, "        \"{insight}\"")?;
    }
    Ok(())
}

pub async fn clear(
    controller: &JournalController,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
    out: &mut dyn Write,
) -> Result<()> {
    if controller.history().await.is_empty() {
        writeln!(out, "No sessions recorded yet.")?;
        return Ok(());
    }
    if !confirm(CLEAR_PROMPT)? {
        return Ok(());
    }
    controller.clear_history().await;
    writeln!(out, "History cleared.")?;
    Ok(())
}

pub async fn share(
    controller: &JournalController,
    settings: &ShareSettings,
    channel: &dyn ShareChannel,
    out: &mut dyn Write,
) -> Result<()> {
    let (data, outcome) = controller.share(settings, channel).await?;
    writeln!(out, "{}", data.text)?;
    writeln!(out, "{}", data.url)?;
    if let Some(notice) = outcome.notice() {
        writeln!(out, "{notice}")?;
    }
    Ok(())
}

/// Open the journal at `link`, importing a shared count if it carries one.
pub async fn open(controller: &JournalController, link: &str, out: &mut dyn Write) -> Result<()> {
    let mut location = Location::parse(link)?;
    match controller.import_from_location(&mut location).await {
        Some(count) => writeln!(out, "Imported shared session: {count} rounds")?,
        None => writeln!(out, "No shared session in link.")?,
    }
    writeln!(out, "{}", location.as_str())?;
    Ok(())
}

fn skip_message(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NothingToSave => "Nothing to save yet. Tap to count rounds first.",
        SkipReason::InvalidCount => "Enter a whole number of rounds greater than zero.",
        SkipReason::Busy => "Still recording the previous session.",
    }
}

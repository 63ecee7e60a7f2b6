use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pradakshina", version, about = "Count and journal your Pradakshina rounds")]
pub struct Cli {
    /// Directory holding the journal database and settings.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current session, lifetime total and stats
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count rounds in the current session
    Tap {
        /// Number of rounds to count
        #[arg(long, default_value = "1")]
        times: u32,
    },
    /// Discard the current session without saving
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Save the current session to history
    Save,
    /// Add rounds completed away from the counter
    Add {
        /// Number of rounds (e.g. 108)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Review saved sessions, newest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete all history and reset the lifetime counter
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Build a link that shares the current count
    Share,
    /// Open a shared link, importing its count
    Open {
        /// Link containing a `count` parameter
        link: String,
    },
}

mod cli;
pub mod db;
pub mod insight;
pub mod journal;
pub mod models;
pub mod settings;
pub mod share;
pub mod store;
mod utils;

use std::{io, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use db::Database;
use insight::InsightGenerator;
use journal::{commands, JournalController};
use settings::{api_key_from_env, resolve_data_dir, SettingsStore};
use share::TerminalShare;
use store::StateRepository;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still overrides the default level.
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(execute(cli))
}

async fn execute(cli: Cli) -> Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir)?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    log::debug!("Using data directory {}", data_dir.display());

    let settings = SettingsStore::new(data_dir.join("settings.json"))?;
    log::debug!("Loaded settings from {}", settings.path().display());
    let database = Database::new(data_dir.join("pradakshina.sqlite3"))?;
    let insight = InsightGenerator::from_settings(&settings.insight(), api_key_from_env())?;
    let controller =
        JournalController::load(StateRepository::new(Arc::new(database)), insight).await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let confirm = |assume_yes: bool| {
        move |question: &str| -> Result<bool> {
            if assume_yes {
                return Ok(true);
            }
            let stdin = io::stdin();
            commands::prompt_confirm(&mut stdin.lock(), &mut io::stderr(), question)
        }
    };

    match cli.cmd {
        Command::Status { json } => commands::status(&controller, json, &mut out).await,
        Command::Tap { times } => commands::tap(&controller, times, &mut out).await,
        Command::Reset { yes } => commands::reset(&controller, &mut confirm(yes), &mut out).await,
        Command::Save => commands::save(&controller, &mut out).await,
        Command::Add { value } => commands::add(&controller, &value, &mut out).await,
        Command::History { json, limit } => {
            commands::history(&controller, json, limit, &mut out).await
        }
        Command::Clear { yes } => commands::clear(&controller, &mut confirm(yes), &mut out).await,
        Command::Share => {
            commands::share(&controller, &settings.share(), &TerminalShare, &mut out).await
        }
        Command::Open { link } => commands::open(&controller, &link, &mut out).await,
    }
}

//! Operator console for single-elimination tournaments.
//!
//! Reads bot-style commands from stdin, forwards them to a per-guild
//! tournament actor and prints the rendered replies.

mod commands;
mod config;
mod logging;
mod session;

use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::Error;
use bracket_engine::registry::{JsonFileStore, MemoryStore, SnapshotStore, TournamentRegistry};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use tokio::io::{AsyncBufReadExt, BufReader};

use commands::parse_command;
use config::ConsoleConfig;
use session::{Console, Reply};

const HELP: &str = "\
Run an interactive tournament bracket console

USAGE:
  bracket_console [OPTIONS]

OPTIONS:
  --guild      ID          Guild to manage              [default: env BRACKET_GUILD_ID or 1]
  --snapshot   PATH        Snapshot file                [default: env BRACKET_SNAPSHOT_PATH or bracket_snapshot.json]

FLAGS:
  --in-memory              Don't load or save a snapshot file
  -h, --help               Print help information

ENVIRONMENT:
  BRACKET_INVITE_TTL_SECS  Seconds before a team invite expires  [default: 300]
  BRACKET_INBOX_CAPACITY   Actor inbox size                      [default: 100]
  BRACKET_REWARDS          Points per placement                  [default: 100,70,50,50]
  RUST_LOG                 Log filter                            [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let guild: Option<u64> = pargs.opt_value_from_str("--guild")?;
    let snapshot: Option<PathBuf> = pargs.opt_value_from_str("--snapshot")?;
    let in_memory = pargs.contains("--in-memory");

    let config = ConsoleConfig::from_env(guild, snapshot, in_memory)?;
    config.validate()?;

    logging::init();

    let store: Arc<dyn SnapshotStore> = match &config.snapshot_path {
        Some(path) => {
            info!("Using snapshot file {}", path.display());
            Arc::new(JsonFileStore::new(path))
        }
        None => Arc::new(MemoryStore::new()),
    };
    let registry = Arc::new(TournamentRegistry::new(config.registry.clone(), store));
    registry.load().await?;

    // Catching signals so the final checkpoint still runs.
    let (interrupt_tx, mut interrupt_rx) = tokio::sync::mpsc::unbounded_channel();
    set_handler(move || {
        let _ = interrupt_tx.send(());
    })?;

    info!("Managing guild {}", config.guild_id);
    println!("Type 'help' to see available commands");

    let mut console = Console::new(registry.clone(), config.guild_id);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = interrupt_rx.recv() => {
                info!("Interrupted");
                None
            }
        };

        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match console.execute(command).await {
            Reply::Text(text) => println!("{text}"),
            Reply::Quit => break,
        }
    }

    let saved = registry.shutdown().await?;
    info!("Saved {} tournaments, bye", saved);
    Ok(())
}

mod command;
mod session;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use undo_history::HistoryConfig;

use crate::command::Command;
use crate::session::Session;

/// Drives an undo/redo history over a counter from line commands.
///
/// Commands: add N, record N, undo, redo, begin, end, clear, state, fail.
#[derive(Parser, Debug)]
#[command(name = "undo-history-demo", version, about)]
struct Cli {
    /// Script file with one command per line. Reads stdin when omitted.
    script: Option<PathBuf>,

    /// JSON history config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of history entries (overrides config and environment).
    #[arg(long = "max-size")]
    max_size: Option<usize>,
}

impl Cli {
    fn history_config(&self) -> HistoryConfig {
        let mut config = match &self.config {
            Some(path) => HistoryConfig::load(path),
            None => HistoryConfig::from_env(),
        };
        if let Some(max_size) = self.max_size {
            config.max_size = max_size;
        }
        config.sanitize();
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.history_config();
    tracing::info!(max_size = config.max_size, "Starting undo-history-demo");

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(std::io::BufReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open script: {}", path.display()))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };

    let mut session = Session::new(config);
    for (number, line) in input.lines().enumerate() {
        let line = line.context("Failed to read command")?;
        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("line {}: {e}", number + 1);
                continue;
            }
        };
        if let Err(e) = session.apply(cmd).await {
            eprintln!("line {}: {cmd:?} failed: {e}", number + 1);
        }
        println!("{}", session.status());
    }

    Ok(())
}

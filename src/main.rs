mod app;
mod date;
mod github;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Terminal GitHub user finder: type a username, get the profile card and
/// the five most recent repositories. Every keystroke re-runs the search.
#[derive(Parser)]
#[command(name = "gitfind", version, about)]
struct Cli {
    /// Username to search for on startup
    username: Option<String>,

    /// Color theme
    #[arg(long, value_enum, default_value = "dark")]
    theme: ui::Theme,

    /// Write log output to this file (filtered via RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let client = github::GithubClient::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = app::App::new(Arc::new(client), tx.clone());

    if let Some(username) = &cli.username {
        app.set_query(username);
    }

    ui::run(&mut app, &mut rx, tx, cli.theme).await
}

// The terminal owns stdout while the UI runs, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

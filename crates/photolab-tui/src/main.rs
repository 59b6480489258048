//! Photo Lab TUI - PIN-gated photo editor
//!
//! Opens on a locked home screen. The editor is only reachable after the PIN
//! modal verifies the stored PIN, or creates one on first run.

use std::fs::{self, File};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use photolab_auth::{CredentialStore, FileStore, PinConfig};
use photolab_tui::App;

/// Log file name under the data directory
const LOG_FILE_NAME: &str = "photolab-tui.log";

/// Photo Lab - PIN-gated photo editor
#[derive(Parser, Debug)]
#[command(name = "photolab-tui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Credential store file
    #[arg(long)]
    store: Option<PathBuf>,

    /// Delete the stored PIN and exit
    #[arg(long)]
    reset_pin: bool,

    /// Log file (the terminal is in raw mode while running)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Application entry point with panic handling for terminal restoration
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;

    let config = match &cli.config {
        Some(path) => PinConfig::load_from(path),
        None => PinConfig::load(),
    };
    let store = Arc::new(FileStore::new(
        cli.store.clone().unwrap_or_else(FileStore::default_path),
    ));

    if cli.reset_pin {
        store
            .delete(&config.store_key)
            .await
            .with_context(|| format!("failed to reset PIN in {}", store.path().display()))?;
        info!("Stored PIN removed");
        println!("Stored PIN removed from {}", store.path().display());
        return Ok(());
    }

    info!("Photo Lab v{} starting", env!("CARGO_PKG_VERSION"));
    let result = run_app(config, store).await;

    if let Err(e) = &result {
        tracing::error!("Application error: {}", e);
    }

    result
}

/// Main application runner
async fn run_app(config: PinConfig, store: Arc<FileStore>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photo-lab")
        .join(LOG_FILE_NAME)
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive("photolab_tui=info".parse()?)
                .add_directive("photolab_auth=info".parse()?),
        )
        .init();

    Ok(())
}

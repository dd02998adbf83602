//! Vault Level Daemon - tracks writing progress for a Markdown vault
//!
//! Scans the vault, keeps XP/level/streak state next to it, and recomputes
//! whenever notes change.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use level_common::{JsonFileStore, LevelUp, ProgressEngine, StateStore, UpdateScheduler, VERSION};
use leveld::{render_status, session, FsVault, LevelConfig, RenderOptions, VaultWatcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leveld")]
#[command(about = "Vault Level - XP, levels, and streaks for your notes", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Config file (default: ~/.config/vault-level/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the vault and recompute on changes
    Watch {
        /// Vault directory (overrides vault_path)
        #[arg(long)]
        vault: Option<PathBuf>,
    },

    /// Recompute once and print the status panel
    Scan {
        /// Vault directory (overrides vault_path)
        #[arg(long)]
        vault: Option<PathBuf>,
    },

    /// Print the saved status panel without scanning
    Status {
        /// Vault directory (overrides vault_path)
        #[arg(long)]
        vault: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise start at info and switch to the configured level
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter.unwrap_or_else(|| EnvFilter::new("info")))
        .with_filter_reloading();
    let reload = builder.reload_handle();
    builder.init();

    let config = LevelConfig::load(cli.config.as_deref());
    if !from_env {
        match EnvFilter::try_new(&config.log_level) {
            Ok(filter) => {
                if let Err(e) = reload.reload(filter) {
                    warn!("Could not apply log level {}: {}", config.log_level, e);
                }
            }
            Err(e) => warn!("Invalid log_level {:?}: {}", config.log_level, e),
        }
    }

    match cli.command {
        Commands::Watch { vault } => watch(config.with_vault(vault)).await,
        Commands::Scan { vault } => scan(config.with_vault(vault)).await,
        Commands::Status { vault } => status(config.with_vault(vault)),
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn watch(config: LevelConfig) -> Result<()> {
    info!("Vault Level Daemon v{} starting", VERSION);

    let root = vault_root(&config.vault_path)?;
    let mut engine = open_engine(&root, &config);

    let (up_tx, up_rx) = mpsc::unbounded_channel::<LevelUp>();
    tokio::spawn(session::log_badges(up_rx));

    // Watch before the initial scan so edits made during it are queued
    let (tx, rx) = mpsc::unbounded_channel();
    let _watcher = VaultWatcher::new(&root, tx)?;
    session::initial_scan(&mut engine, &up_tx).await;

    let scheduler = UpdateScheduler::new(config.debounce(), &config.extension);
    info!("Vault Level ready");

    tokio::select! {
        fired = scheduler.run(rx, &mut engine, Some(&up_tx)) => {
            info!("Change feed closed after {} recomputes", fired);
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down gracefully");
        }
    }

    Ok(())
}

async fn scan(config: LevelConfig) -> Result<()> {
    let root = vault_root(&config.vault_path)?;
    let mut engine = open_engine(&root, &config);

    let outcome = engine
        .recompute()
        .await
        .with_context(|| format!("Failed to scan vault {}", root.display()))?;

    if outcome.skipped > 0 {
        warn!("{} notes could not be read", outcome.skipped);
    }

    print!(
        "{}",
        render_status(&outcome.state, &RenderOptions::from(&config.display))
    );
    Ok(())
}

fn status(config: LevelConfig) -> Result<()> {
    let store = JsonFileStore::new(config.state_path());
    let state = store
        .load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    match state {
        Some(state) => print!(
            "{}",
            render_status(&state, &RenderOptions::from(&config.display))
        ),
        None => println!(
            "No progress saved for {} yet. Run `leveld scan` first.",
            config.vault_path.display()
        ),
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn vault_root(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path)
        .with_context(|| format!("Vault directory {} not found", path.display()))
}

fn open_engine(root: &Path, config: &LevelConfig) -> ProgressEngine<FsVault, JsonFileStore> {
    let store = JsonFileStore::new(config.state_path());
    info!("Progress state at {}", store.path().display());
    ProgressEngine::open(FsVault::new(root, &config.extension), store)
}

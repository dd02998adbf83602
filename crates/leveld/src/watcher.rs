//! Vault Watcher - turns filesystem notifications into change events
//!
//! Watches the vault recursively. Events under hidden directories
//! (`.obsidian`, `.git`, the state directory) are dropped here; extension
//! filtering is left to the scheduler.

use anyhow::{Context, Result};
use level_common::ChangeEvent;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
}

impl VaultWatcher {
    pub fn new(root: &Path, tx: mpsc::UnboundedSender<ChangeEvent>) -> Result<Self> {
        let base = root.to_path_buf();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in translate(&base, &event) {
                    debug!("Vault change: {:?} {}", change.kind, change.path.display());
                    let _ = tx.send(change);
                }
            }
            Err(e) => warn!("Watch error: {:?}", e),
        })
        .context("Failed to create filesystem watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;

        info!("Watching vault at {}", root.display());

        Ok(Self { _watcher: watcher })
    }
}

/// Map one notify event onto zero or more change events
pub fn translate(root: &Path, event: &Event) -> Vec<ChangeEvent> {
    let visible = |p: &&PathBuf| !is_hidden(root, p);

    match &event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            let (from, to) = (&event.paths[0], &event.paths[1]);
            match (is_hidden(root, from), is_hidden(root, to)) {
                (false, false) => vec![ChangeEvent::renamed(from, to)],
                (true, false) => vec![ChangeEvent::created(to)],
                (false, true) => vec![ChangeEvent::deleted(from)],
                (true, true) => Vec::new(),
            }
        }
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .iter()
            .filter(visible)
            .map(ChangeEvent::created)
            .collect(),
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
            .paths
            .iter()
            .filter(visible)
            .map(ChangeEvent::deleted)
            .collect(),
        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter(visible)
            .map(ChangeEvent::modified)
            .collect(),
        _ => Vec::new(),
    }
}

/// True when any component below the root starts with `.`
fn is_hidden(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str().to_str().map(|s| s.starts_with('.')).unwrap_or(false))
}

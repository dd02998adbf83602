//! State persistence.
//!
//! The engine only needs load/save of one opaque blob. `JsonFileStore` keeps
//! it as pretty JSON on disk; `MemoryStore` keeps it in process.

use crate::error::{LevelError, Result};
use crate::state::ProgressState;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Durable load/save of the progress blob
pub trait StateStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<ProgressState>>;
    fn save(&self, state: &ProgressState) -> Result<()>;
}

/// State stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/state.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<ProgressState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let state = serde_json::from_str(&raw)?;
        Ok(Some(state))
    }

    fn save(&self, state: &ProgressState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling file first so a crash never leaves half a blob
        let tmp = self.temp_path();
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process store, shareable between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<ProgressState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ProgressState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }

    /// Last saved state, if any
    pub fn snapshot(&self) -> Option<ProgressState> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<ProgressState>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| LevelError::Store("memory store poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, state: &ProgressState) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| LevelError::Store("memory store poisoned".to_string()))?;
        *slot = Some(state.clone());
        Ok(())
    }
}

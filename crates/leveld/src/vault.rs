//! Filesystem vault - a directory of Markdown notes as a [`VaultSource`].

use crate::markdown;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use level_common::{DocumentId, DocumentSnapshot, LevelError, Result, VaultSource};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Notes under a root directory with one tracked extension
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    extension: String,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a document id
    pub fn path_of(&self, id: &DocumentId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

#[async_trait]
impl VaultSource for FsVault {
    async fn list_documents(&self) -> Result<Vec<DocumentId>> {
        let root = self.root.clone();
        let extension = self.extension.clone();

        tokio::task::spawn_blocking(move || scan(&root, &extension))
            .await
            .map_err(|e| LevelError::Source(format!("vault scan task failed: {}", e)))?
    }

    async fn load_document(&self, id: &DocumentId) -> Result<DocumentSnapshot> {
        let path = self.path_of(id);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LevelError::document(id.as_str(), e))?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| LevelError::document(id.as_str(), e))?;

        let created = meta.created().ok().map(DateTime::<Utc>::from);
        let modified = meta.modified().ok().map(DateTime::<Utc>::from);
        let metadata = markdown::parse(&content);

        Ok(DocumentSnapshot::new(id.clone(), content)
            .with_metadata(metadata)
            .with_times(created, modified))
    }
}

// ============================================================================
// Enumeration
// ============================================================================

/// Walk the vault and return sorted ids of tracked files
pub fn scan(root: &Path, extension: &str) -> Result<Vec<DocumentId>> {
    if !root.is_dir() {
        return Err(LevelError::Source(format!(
            "vault root {} is not a directory",
            root.display()
        )));
    }

    let mut ids = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable vault entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(id) = document_id(root, entry.path()) {
            ids.push(id);
        }
    }

    ids.sort();
    debug!("Found {} documents under {}", ids.len(), root.display());
    Ok(ids)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Vault-relative id with `/` separators
fn document_id(root: &Path, path: &Path) -> Option<DocumentId> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;

    Some(DocumentId::new(parts.join("/")))
}

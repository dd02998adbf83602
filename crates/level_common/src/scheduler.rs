//! Update scheduler.
//!
//! Debounces change notifications into one recompute per quiet period. There
//! is a single pending deadline; every qualifying event replaces it, and the
//! recompute runs only once the deadline passes with no newer event. The
//! recompute is awaited inline, so events that arrive during a scan wait in
//! the channel and arm the next window afterwards.

use crate::engine::RecomputeOutcome;
use crate::error::Result;
use crate::progression::LevelUp;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, warn};

/// Quiet period before a burst of changes is acted on
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Extension of tracked documents
pub const DEFAULT_EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    Renamed { from: PathBuf },
}

/// One change notification from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Created, path)
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Modified, path)
    }

    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Deleted, path)
    }

    pub fn renamed(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Renamed { from: from.into() }, to)
    }
}

/// Something the scheduler can ask to recompute
#[async_trait]
pub trait Recompute: Send {
    async fn recompute(&mut self) -> Result<RecomputeOutcome>;
}

#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    quiet_period: Duration,
    extension: String,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD, DEFAULT_EXTENSION)
    }
}

impl UpdateScheduler {
    /// `extension` may be given with or without the leading dot
    pub fn new(quiet_period: Duration, extension: &str) -> Self {
        Self {
            quiet_period,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_tracked_path(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }

    /// A rename counts when either side is a tracked document. Creates,
    /// deletes and renames of extensionless paths also count, since a whole
    /// folder of documents may have moved.
    pub fn tracks(&self, event: &ChangeEvent) -> bool {
        match &event.kind {
            ChangeKind::Modified => self.is_tracked_path(&event.path),
            ChangeKind::Created | ChangeKind::Deleted => self.may_hold_documents(&event.path),
            ChangeKind::Renamed { from } => {
                self.may_hold_documents(&event.path) || self.may_hold_documents(from)
            }
        }
    }

    fn may_hold_documents(&self, path: &Path) -> bool {
        self.is_tracked_path(path) || path.extension().is_none()
    }

    /// Drive `target` from `events` until the channel closes. A recompute
    /// still pending at close runs once before returning. Returns the number
    /// of recomputes started.
    pub async fn run<R: Recompute>(
        &self,
        mut events: mpsc::UnboundedReceiver<ChangeEvent>,
        target: &mut R,
        level_ups: Option<&mpsc::UnboundedSender<LevelUp>>,
    ) -> u64 {
        let mut pending: Option<Instant> = None;
        let mut fired = 0u64;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if self.tracks(&event) {
                            debug!("Change {:?} on {}, rescheduling update", event.kind, event.path.display());
                            pending = Some(Instant::now() + self.quiet_period);
                        }
                    }
                    None => {
                        if pending.take().is_some() {
                            self.fire(target, level_ups).await;
                            fired += 1;
                        }
                        break;
                    }
                },
                _ = wait_for(pending) => {
                    pending = None;
                    self.fire(target, level_ups).await;
                    fired += 1;
                }
            }
        }

        debug!("Change feed closed after {} scheduled updates", fired);
        fired
    }

    async fn fire<R: Recompute>(
        &self,
        target: &mut R,
        level_ups: Option<&mpsc::UnboundedSender<LevelUp>>,
    ) {
        match target.recompute().await {
            Ok(outcome) => {
                if let (Some(up), Some(tx)) = (outcome.level_up, level_ups) {
                    let _ = tx.send(up);
                }
            }
            Err(e) => warn!("Scheduled update failed: {}", e),
        }
    }
}

/// Sleep until the deadline, or forever when nothing is pending
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

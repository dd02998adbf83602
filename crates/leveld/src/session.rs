//! Watch session helpers shared by the daemon loop.

use level_common::{badge_for, Badge, LevelUp, Recompute, RecomputeOutcome};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Run the startup scan and forward its level-up like any scheduled one.
/// The vault watcher must already be running so edits made meanwhile queue
/// up for the scheduler.
pub async fn initial_scan<R: Recompute>(
    target: &mut R,
    level_ups: &mpsc::UnboundedSender<LevelUp>,
) -> Option<RecomputeOutcome> {
    match target.recompute().await {
        Ok(outcome) => {
            if let Some(up) = outcome.level_up {
                let _ = level_ups.send(up);
            }
            Some(outcome)
        }
        Err(e) => {
            warn!("Initial scan failed: {}", e);
            None
        }
    }
}

/// The badge gained by a level-up, if it crossed into a new band
pub fn new_badge(up: LevelUp) -> Option<&'static Badge> {
    let (old, new) = (badge_for(up.from), badge_for(up.to));
    (old != new).then_some(new)
}

/// Log badge changes until the sender side closes
pub async fn log_badges(mut level_ups: mpsc::UnboundedReceiver<LevelUp>) {
    while let Some(up) = level_ups.recv().await {
        if let Some(badge) = new_badge(up) {
            info!("New badge: {} {}", badge.emoji, badge.title);
        }
    }
}

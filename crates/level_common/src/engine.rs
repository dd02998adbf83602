//! Progress engine - owns the persisted state and runs the full pipeline.
//!
//! Every recompute starts from scratch: enumerate, extract, aggregate,
//! advance the streak, level, save. Nothing is carried over between passes
//! except the streak fields.

use crate::aggregate::StatsAccumulator;
use crate::badge::Badge;
use crate::error::Result;
use crate::metrics;
use crate::progression::{compute_progress, LevelUp};
use crate::scheduler::Recompute;
use crate::source::VaultSource;
use crate::state::ProgressState;
use crate::store::StateStore;
use crate::streak;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::{debug, info, warn};

/// Result of one recompute pass
#[derive(Debug, Clone)]
pub struct RecomputeOutcome {
    pub state: ProgressState,
    pub level_up: Option<LevelUp>,
    /// Documents left out of this pass because they could not be read
    pub skipped: u64,
}

pub struct ProgressEngine<S, T> {
    source: S,
    store: T,
    state: ProgressState,
}

impl<S: VaultSource, T: StateStore> ProgressEngine<S, T> {
    /// Load persisted state, or start from defaults (saved right away) when
    /// there is none. An unreadable blob also falls back to defaults.
    pub fn open(source: S, store: T) -> Self {
        let state = match store.load() {
            Ok(Some(state)) => {
                debug!("Loaded progress state: level {}, streak {}", state.level, state.streak);
                state
            }
            Ok(None) => {
                info!("No saved progress state, starting at level 1");
                let state = ProgressState::default();
                if let Err(e) = store.save(&state) {
                    warn!("Could not save initial progress state: {}", e);
                }
                state
            }
            Err(e) => {
                warn!("Could not load progress state, starting fresh: {}", e);
                ProgressState::default()
            }
        };

        Self {
            source,
            store,
            state,
        }
    }

    /// Last computed state
    pub fn current_state(&self) -> &ProgressState {
        &self.state
    }

    pub fn has_streak_bonus(&self) -> bool {
        self.state.has_streak_bonus()
    }

    pub fn badge(&self) -> &'static Badge {
        self.state.badge()
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Recompute against the local wall clock
    pub async fn recompute(&mut self) -> Result<RecomputeOutcome> {
        self.recompute_at(Local::now()).await
    }

    /// Recompute with "today" taken from `now` in its own time zone
    pub async fn recompute_at<Tz: TimeZone>(&mut self, now: DateTime<Tz>) -> Result<RecomputeOutcome> {
        let tz = now.timezone();
        let today = now.date_naive();
        let now_utc: DateTime<Utc> = now.with_timezone(&Utc);

        let ids = self.source.list_documents().await?;
        debug!("Recomputing over {} documents for {}", ids.len(), today);

        let mut acc = StatsAccumulator::new();
        let mut has_activity_today = false;

        for id in &ids {
            match self.source.load_document(id).await {
                Ok(doc) => {
                    if streak::touched_on(&doc, today, &tz) {
                        debug!("Activity today: {}", doc.id);
                        has_activity_today = true;
                    }
                    acc.add(metrics::extract(&doc));
                }
                Err(e) => {
                    warn!("Could not process {}: {}", id, e);
                    acc.skip();
                }
            }
        }

        let stats = acc.finish();
        let streak = self
            .state
            .streak_state()
            .advance(has_activity_today, today);
        let progress = compute_progress(&stats, streak.streak);

        let previous_level = self.state.level;
        self.state.apply(stats, streak, progress, now_utc);

        info!(
            "Vault stats: {} notes, {} connections, {} tags, {} words -> level {} ({:.0}/{:.0} XP, streak {})",
            stats.total_notes,
            stats.total_connections,
            stats.total_tags,
            stats.total_words,
            progress.level,
            progress.current_xp,
            progress.next_level_xp,
            streak.streak,
        );

        if let Err(e) = self.store.save(&self.state) {
            warn!("Could not save progress state: {}", e);
        }

        let level_up = LevelUp::between(previous_level, progress.level);
        if let Some(up) = level_up {
            info!("Level Up! You reached level {}", up.to);
        }

        Ok(RecomputeOutcome {
            state: self.state.clone(),
            level_up,
            skipped: acc.failed(),
        })
    }
}

#[async_trait]
impl<S, T> Recompute for ProgressEngine<S, T>
where
    S: VaultSource,
    T: StateStore + Send,
{
    async fn recompute(&mut self) -> Result<RecomputeOutcome> {
        ProgressEngine::recompute(self).await
    }
}

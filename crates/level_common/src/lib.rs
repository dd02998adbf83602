//! Level Common - progression engine for a note vault.
//!
//! Turns a snapshot of the vault (content, links, tags, timestamps) into XP,
//! a level, and a daily streak. The host supplies documents through
//! [`VaultSource`] and persistence through [`StateStore`]; change
//! notifications go through [`UpdateScheduler`].

pub mod aggregate;
pub mod badge;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod progression;
pub mod scheduler;
pub mod source;
pub mod state;
pub mod store;
pub mod streak;

pub use aggregate::{aggregate, StatsAccumulator, VaultStats};
pub use badge::{badge_for, Badge, BADGES};
pub use engine::{ProgressEngine, RecomputeOutcome};
pub use error::{LevelError, Result};
pub use metrics::{DocumentId, DocumentMetadata, DocumentMetrics, DocumentSnapshot};
pub use progression::{compute_progress, has_streak_bonus, level_threshold, LevelUp, Progress};
pub use scheduler::{ChangeEvent, ChangeKind, Recompute, UpdateScheduler};
pub use source::VaultSource;
pub use state::ProgressState;
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use streak::StreakState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

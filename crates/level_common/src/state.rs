//! Persisted progress state.
//!
//! One blob per vault. JSON keys are camelCase (`currentXP`,
//! `lastActivityDate`, ...); missing fields take their defaults.

use crate::aggregate::VaultStats;
use crate::badge::{badge_for, Badge};
use crate::progression::{self, Progress};
use crate::streak::StreakState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressState {
    pub level: u32,
    #[serde(rename = "currentXP")]
    pub current_xp: f64,
    #[serde(rename = "totalXP")]
    pub total_xp: f64,
    #[serde(rename = "nextLevelXP")]
    pub next_level_xp: f64,
    pub streak: u32,
    #[serde(rename = "lastActivityDate", with = "activity_date")]
    pub last_activity_date: Option<NaiveDate>,
    pub stats: VaultStats,
    #[serde(rename = "lastUpdated", with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0.0,
            total_xp: 0.0,
            next_level_xp: progression::level_threshold(1),
            streak: 0,
            last_activity_date: None,
            stats: VaultStats::default(),
            last_updated: Utc::now(),
        }
    }
}

impl ProgressState {
    pub fn streak_state(&self) -> StreakState {
        StreakState::new(self.streak, self.last_activity_date)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            level: self.level,
            current_xp: self.current_xp,
            next_level_xp: self.next_level_xp,
            total_xp: self.total_xp,
        }
    }

    /// Replace every derived field with the result of a recompute
    pub fn apply(
        &mut self,
        stats: VaultStats,
        streak: StreakState,
        progress: Progress,
        now: DateTime<Utc>,
    ) {
        self.stats = stats;
        self.streak = streak.streak;
        self.last_activity_date = streak.last_activity_date;
        self.level = progress.level;
        self.current_xp = progress.current_xp;
        self.next_level_xp = progress.next_level_xp;
        self.total_xp = progress.total_xp;
        self.last_updated = now;
    }

    pub fn has_streak_bonus(&self) -> bool {
        progression::has_streak_bonus(self.streak)
    }

    pub fn badge(&self) -> &'static Badge {
        badge_for(self.level)
    }

    pub fn progress_fraction(&self) -> f64 {
        progression::progress_fraction(self.current_xp, self.next_level_xp)
    }

    /// Same progression and stats, ignoring `last_updated`
    pub fn same_progress(&self, other: &Self) -> bool {
        Self {
            last_updated: other.last_updated,
            ..self.clone()
        } == *other
    }
}

/// `lastActivityDate` as an ISO day. Also reads the `Date.toDateString()`
/// form (`Sun Oct 18 2026`) that older blobs carry.
mod activity_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::debug;

    const ISO: &str = "%Y-%m-%d";
    const LEGACY: &str = "%a %b %d %Y";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(ISO).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let parsed = NaiveDate::parse_from_str(raw, ISO)
            .or_else(|_| NaiveDate::parse_from_str(raw, LEGACY))
            .ok();
        if parsed.is_none() {
            debug!("Ignoring unreadable lastActivityDate {:?}", raw);
        }
        parsed
    }
}

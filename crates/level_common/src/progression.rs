//! Progression engine: XP formula and leveling curve.
//!
//! ## XP
//!
//! ```text
//! base  = notes*15 + connections*8 + tags*5 + floor(words/100)*2
//! total = base * 1.05 when streak >= 7, else base
//! ```
//!
//! ## Curve
//!
//! Level 1 needs 100 XP. Each level after that needs
//! `floor(100 * 1.25^(level-1))`: 125, 156, 195, 244, ...
//!
//! XP is recomputed from the corpus every pass, never accumulated.

use crate::aggregate::VaultStats;
use serde::{Deserialize, Serialize};

/// XP weights
pub const XP_PER_NOTE: u64 = 15;
pub const XP_PER_CONNECTION: u64 = 8;
pub const XP_PER_TAG: u64 = 5;
pub const XP_PER_HUNDRED_WORDS: u64 = 2;

/// Streak length that unlocks the bonus
pub const STREAK_BONUS_DAYS: u32 = 7;
/// Bonus applied to base XP while the streak bonus is active
pub const STREAK_BONUS_RATE: f64 = 0.05;

const BASE_THRESHOLD: f64 = 100.0;
const GROWTH: f64 = 1.25;

/// Level and XP derived from stats + streak
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub current_xp: f64,
    pub next_level_xp: f64,
    pub total_xp: f64,
}

impl Progress {
    /// Fraction of the current level completed, clamped to 0.0-1.0
    pub fn fraction(&self) -> f64 {
        progress_fraction(self.current_xp, self.next_level_xp)
    }
}

/// A level increase observed by a recompute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
}

impl LevelUp {
    /// `Some` only when `to` is above `from`
    pub fn between(from: u32, to: u32) -> Option<Self> {
        (to > from).then_some(Self { from, to })
    }
}

/// Whether a streak earns the XP bonus
pub fn has_streak_bonus(streak: u32) -> bool {
    streak >= STREAK_BONUS_DAYS
}

/// XP before any streak bonus
pub fn base_xp(stats: &VaultStats) -> u64 {
    stats.total_notes * XP_PER_NOTE
        + stats.total_connections * XP_PER_CONNECTION
        + stats.total_tags * XP_PER_TAG
        + (stats.total_words / 100) * XP_PER_HUNDRED_WORDS
}

/// Lifetime XP including the streak bonus
pub fn total_xp(stats: &VaultStats, streak: u32) -> f64 {
    let base = base_xp(stats) as f64;
    if has_streak_bonus(streak) {
        base + base * STREAK_BONUS_RATE
    } else {
        base
    }
}

/// XP needed to clear `level` (levels start at 1)
pub fn level_threshold(level: u32) -> f64 {
    let exponent = level.saturating_sub(1).min(i32::MAX as u32) as i32;
    (BASE_THRESHOLD * GROWTH.powi(exponent)).floor()
}

/// Walk the curve from level 1 until the remaining XP no longer clears a level
pub fn level_for_xp(total_xp: f64) -> Progress {
    let mut level = 1u32;
    let mut threshold = level_threshold(level);
    let mut remaining = total_xp.max(0.0);

    while remaining >= threshold {
        remaining -= threshold;
        level += 1;
        threshold = level_threshold(level);
    }

    Progress {
        level,
        current_xp: remaining,
        next_level_xp: threshold,
        total_xp,
    }
}

/// Full progression for a corpus
pub fn compute_progress(stats: &VaultStats, streak: u32) -> Progress {
    level_for_xp(total_xp(stats, streak))
}

/// `current / next` clamped to 0.0-1.0
pub fn progress_fraction(current_xp: f64, next_level_xp: f64) -> f64 {
    if next_level_xp <= 0.0 {
        return 1.0;
    }
    (current_xp / next_level_xp).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(level_threshold(1), 100.0);
        assert_eq!(level_threshold(2), 125.0);
        assert_eq!(level_threshold(3), 156.0);
        assert_eq!(level_threshold(4), 195.0);
        assert_eq!(level_threshold(5), 244.0);
        assert_eq!(level_threshold(10), 745.0);
    }

    #[test]
    fn test_zero_xp_is_level_one() {
        let p = level_for_xp(0.0);
        assert_eq!(p.level, 1);
        assert_eq!(p.current_xp, 0.0);
        assert_eq!(p.next_level_xp, 100.0);
    }

    #[test]
    fn test_exact_threshold_levels_up() {
        let p = level_for_xp(100.0);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_xp, 0.0);
        assert_eq!(p.next_level_xp, 125.0);

        let p = level_for_xp(99.99);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn test_base_xp_floors_words() {
        let stats = VaultStats {
            total_words: 199,
            ..Default::default()
        };
        assert_eq!(base_xp(&stats), 2);
    }

    #[test]
    fn test_streak_bonus_boundary() {
        assert!(!has_streak_bonus(6));
        assert!(has_streak_bonus(7));
        assert!(has_streak_bonus(30));
    }

    #[test]
    fn test_level_up_between() {
        assert_eq!(LevelUp::between(2, 4), Some(LevelUp { from: 2, to: 4 }));
        assert_eq!(LevelUp::between(4, 4), None);
        assert_eq!(LevelUp::between(5, 3), None);
    }

    #[test]
    fn test_progress_fraction_clamps() {
        assert_eq!(progress_fraction(50.0, 100.0), 0.5);
        assert_eq!(progress_fraction(150.0, 100.0), 1.0);
        assert_eq!(progress_fraction(-1.0, 100.0), 0.0);
        assert_eq!(progress_fraction(1.0, 0.0), 1.0);
    }
}

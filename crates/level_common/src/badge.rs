//! Level badges.
//!
//! Sorted threshold table; a level takes the badge of the highest threshold
//! at or below it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub min_level: u32,
    pub emoji: &'static str,
    pub title: &'static str,
    pub color: &'static str,
}

const fn badge(min_level: u32, emoji: &'static str, title: &'static str, color: &'static str) -> Badge {
    Badge {
        min_level,
        emoji,
        title,
        color,
    }
}

/// Badge bands, ascending by `min_level`
pub const BADGES: &[Badge] = &[
    badge(1, "🌱", "Seedling", "#65a30d"),
    badge(5, "🍃", "Budding", "#16a34a"),
    badge(10, "🌿", "Flourishing", "#22c55e"),
    badge(15, "📚", "Scholar", "#ef4444"),
    badge(20, "🎓", "Graduate", "#f59e0b"),
    badge(30, "🔮", "Sage", "#a855f7"),
    badge(40, "⚡", "Master", "#84cc16"),
    badge(50, "🌟", "Stellar", "#eab308"),
    badge(60, "💎", "Diamond", "#0ea5e9"),
    badge(70, "🔱", "Titan", "#f97316"),
    badge(80, "⚛️", "Quantum", "#06b6d4"),
    badge(90, "🌠", "Transcendent", "#ec4899"),
    badge(100, "🌀", "Eternal", "#8b5cf6"),
];

/// Badge for a level. Levels below the first band get the first badge.
pub fn badge_for(level: u32) -> &'static Badge {
    let idx = BADGES.partition_point(|b| b.min_level <= level);
    &BADGES[idx.saturating_sub(1)]
}

impl Badge {
    /// Color as an RGB triple, parsed from the `#rrggbb` table entry
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.color.trim_start_matches('#');
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .unwrap_or(0)
        };
        (channel(0), channel(2), channel(4))
    }
}

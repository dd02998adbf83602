//! Status panel rendering.

use crate::config::DisplayConfig;
use level_common::ProgressState;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub color: bool,
    pub bar_width: usize,
}

impl From<&DisplayConfig> for RenderOptions {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            color: display.color,
            bar_width: display.bar_width,
        }
    }
}

/// Text panel for one progress state
pub fn render_status(state: &ProgressState, opts: &RenderOptions) -> String {
    let badge = state.badge();
    let bonus = state.has_streak_bonus();
    let fraction = state.progress_fraction();

    let title = if opts.color {
        let (r, g, b) = badge.rgb();
        badge.title.truecolor(r, g, b).bold().to_string()
    } else {
        badge.title.to_string()
    };

    let mut xp_line = format!(
        "{}/{} XP",
        format_number(state.current_xp),
        format_number(state.next_level_xp)
    );
    if bonus {
        xp_line.push_str("  🔥 +5%");
    }

    let streak = if bonus {
        format!("🔥 {} days", state.streak)
    } else {
        format!("{} days", state.streak)
    };

    let stats = &state.stats;
    let rows = [
        ("Notes", format_number(stats.total_notes as f64)),
        ("Connections", format_number(stats.total_connections as f64)),
        ("Tags", format_number(stats.total_tags as f64)),
        ("Words", format_number(stats.total_words as f64)),
        ("Streak", streak),
        ("Total XP", format_number(state.total_xp)),
    ];

    let mut out = String::new();
    out.push_str(&format!("{} {}  Level {}\n", badge.emoji, title, state.level));
    out.push_str(&xp_line);
    out.push('\n');
    out.push_str(&format!(
        "{} {}%\n\n",
        progress_bar(fraction, opts.bar_width),
        (fraction * 100.0).round() as u32
    ));
    for (label, value) in rows {
        out.push_str(&format!("  {:<12} {}\n", label, value));
    }
    out.push('\n');
    out.push_str(if bonus {
        "✨ +5% XP Bonus Active! Keep the streak! 🔥"
    } else {
        "✨ Keep writing to earn more XP!"
    });
    out.push('\n');
    out
}

/// `1.2M`, `3.5K`, or the number itself with at most two decimals
pub fn format_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.1}M", one_decimal(n / 1_000_000.0))
    } else if n >= 1_000.0 {
        format!("{:.1}K", one_decimal(n / 1_000.0))
    } else {
        format!("{}", (n * 100.0).round() / 100.0)
    }
}

fn one_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// `[=====-----]` for a fraction in [0, 1]
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), "-".repeat(empty))
}

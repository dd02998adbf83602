//! Daily activity streak.
//!
//! Day-granularity state machine over `(streak, last_activity_date)`. A gap of
//! one missed day is forgiven; anything longer restarts the streak at 1.

use crate::metrics::DocumentSnapshot;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::debug;

/// Largest day gap that still continues a streak (one missed day)
pub const GRACE_DAYS: i64 = 2;

/// Persisted streak fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    pub streak: u32,
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn new(streak: u32, last_activity_date: Option<NaiveDate>) -> Self {
        Self {
            streak,
            last_activity_date,
        }
    }

    /// Apply today's activity flag. Calling it again on the same day is a no-op.
    pub fn advance(self, has_activity_today: bool, today: NaiveDate) -> Self {
        let Some(last) = self.last_activity_date else {
            if has_activity_today {
                debug!("Starting new streak on {}", today);
                return Self::new(1, Some(today));
            }
            return self;
        };

        if last == today {
            return self;
        }

        if !has_activity_today {
            debug!("No activity on {}, streak stays at {}", today, self.streak);
            return self;
        }

        let gap = (today - last).num_days();
        if (1..=GRACE_DAYS).contains(&gap) {
            let streak = self.streak.saturating_add(1);
            debug!("Streak continues after {} day gap: {}", gap, streak);
            Self::new(streak, Some(today))
        } else {
            debug!("Streak broken after {} day gap, restarting at 1", gap);
            Self::new(1, Some(today))
        }
    }
}

/// Calendar day of a timestamp in the given time zone
pub fn local_day<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Whether the document was created or modified on `day` (in `tz`)
pub fn touched_on<Tz: TimeZone>(doc: &DocumentSnapshot, day: NaiveDate, tz: &Tz) -> bool {
    [doc.created, doc.modified]
        .into_iter()
        .flatten()
        .any(|at| local_day(at, tz) == day)
}

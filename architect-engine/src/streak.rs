//! Daily streak state machine.
use serde::{Deserialize, Serialize};

use crate::progression::UserProgression;

/// How a completion moved the daily streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First streak-advancing completion for this user.
    Started,
    /// Already advanced today; nothing changes.
    SameDay,
    /// Completion on the day right after the last one.
    Advanced,
    /// A day or more was skipped; the run restarts at 1.
    Reset,
    /// `now` falls before the last recorded completion day; treated as same day.
    ClockRegression,
}

impl StreakTransition {
    /// Whether the transition changed any streak field.
    #[must_use]
    pub const fn changed_streak(self) -> bool {
        matches!(self, Self::Started | Self::Advanced | Self::Reset)
    }
}

/// Apply the streak transition for a completion on epoch-day `today`.
///
/// `weekly_cycle_days` is the weekly payout period; advancing onto a day that is
/// not a multiple of it reopens the weekly claim.
pub fn advance_streak(
    progression: &mut UserProgression,
    today: i64,
    weekly_cycle_days: u32,
) -> StreakTransition {
    let Some(last_day) = progression.last_completion_day else {
        restart(progression, today);
        return StreakTransition::Started;
    };

    if today == last_day {
        return StreakTransition::SameDay;
    }
    if today < last_day {
        log::warn!(
            "clock regression: completion day {today} precedes last streak day {last_day}; streak held"
        );
        return StreakTransition::ClockRegression;
    }
    if last_day.checked_add(1) == Some(today) && progression.daily_streak > 0 {
        progression.daily_streak = progression.daily_streak.saturating_add(1);
        progression.last_completion_day = Some(today);
        if weekly_cycle_days == 0 || progression.daily_streak % weekly_cycle_days != 0 {
            progression.weekly_streak_claimed = false;
        }
        return StreakTransition::Advanced;
    }

    let transition = if progression.daily_streak == 0 {
        StreakTransition::Started
    } else {
        StreakTransition::Reset
    };
    restart(progression, today);
    transition
}

fn restart(progression: &mut UserProgression, today: i64) {
    progression.daily_streak = 1;
    progression.last_completion_day = Some(today);
    progression.weekly_streak_claimed = false;
    progression.monthly_milestone_claimed = false;
}

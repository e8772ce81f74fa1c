//! Per-user progression snapshot.
use serde::{Deserialize, Serialize};

use crate::constants::MILLIS_PER_DAY;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// Day bucket `floor(millis / 86_400_000)`, independent of local calendars.
#[must_use]
pub const fn epoch_day(millis: EpochMillis) -> i64 {
    millis.div_euclid(MILLIS_PER_DAY)
}

/// Leveling, streak, and daily counters for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgression {
    #[serde(default = "UserProgression::default_level")]
    pub level: u32,
    /// XP accumulated within the current level.
    #[serde(default)]
    pub xp: u64,
    /// Lifetime XP.
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub daily_streak: u32,
    /// Epoch-day of the last completion that advanced the streak; `None` before the first one.
    #[serde(default)]
    pub last_completion_day: Option<i64>,
    #[serde(default)]
    pub tasks_completed_today: u32,
    #[serde(default)]
    pub today_reset_day: i64,
    #[serde(default)]
    pub weekly_streak_claimed: bool,
    #[serde(default)]
    pub monthly_milestone_claimed: bool,
}

impl UserProgression {
    const fn default_level() -> u32 {
        1
    }

    /// Reset the daily counter when `today` is past the last reset day.
    pub fn roll_daily_counter(&mut self, today: i64) {
        if self.today_reset_day < today {
            self.tasks_completed_today = 0;
            self.today_reset_day = today;
        }
    }

    /// Credit XP to both the in-level and lifetime totals.
    pub fn credit(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
        self.total_xp = self.total_xp.saturating_add(amount);
    }

    /// Debit XP from both totals, clamping at zero.
    pub fn debit(&mut self, amount: u64) {
        self.xp = self.xp.saturating_sub(amount);
        self.total_xp = self.total_xp.saturating_sub(amount);
    }
}

impl Default for UserProgression {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            xp: 0,
            total_xp: 0,
            daily_streak: 0,
            last_completion_day: None,
            tasks_completed_today: 0,
            today_reset_day: 0,
            weekly_streak_claimed: false,
            monthly_milestone_claimed: false,
        }
    }
}

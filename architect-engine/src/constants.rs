//! Centralized balance and tuning constants for the progression engine.
//!
//! These values back the defaults of [`crate::RewardConfig`]. The shipped
//! `rewards.json` asset mirrors them; when the asset cannot be parsed the
//! engine falls back to the numbers below.

// Time buckets -------------------------------------------------------------
pub const MILLIS_PER_DAY: i64 = 86_400_000;
pub(crate) const MILLIS_PER_SECOND: i64 = 1_000;

// Difficulty base XP ------------------------------------------------------
pub(crate) const EASY_XP: u64 = 100;
pub(crate) const MEDIUM_XP: u64 = 250;
pub(crate) const HARD_XP: u64 = 500;
pub(crate) const EPIC_XP: u64 = 1_000;

// Diminishing returns -------------------------------------------------------
/// Full XP for the first N tasks per day.
pub(crate) const FULL_XP_THRESHOLD: u32 = 7;
/// Reduced XP for tasks below this daily count, grind XP above it.
pub(crate) const HALF_XP_THRESHOLD: u32 = 15;
pub(crate) const FULL_XP_PCT: u32 = 100;
pub(crate) const HALF_XP_PCT: u32 = 50;
pub(crate) const GRIND_XP_PCT: u32 = 10;

// Repetition ----------------------------------------------------------------
pub(crate) const REPETITION_WINDOW_HOURS: u32 = 24;
/// XP kept when repeating the same task title inside the window.
pub(crate) const REPETITION_KEEP_PCT: u32 = 25;

// Velocity damping ----------------------------------------------------------
pub(crate) const VELOCITY_WINDOW_SECS: u32 = 10;
pub(crate) const VELOCITY_HISTORY_CAPACITY: usize = 5;
pub(crate) const VELOCITY_MULTIPLIER_PCTS: [u32; 5] = [100, 90, 80, 70, 60];

// Streak bonus --------------------------------------------------------------
pub(crate) const STREAK_BONUS_MIN_STREAK: u32 = 2;
pub(crate) const STREAK_BONUS_TASK_COUNT: u32 = 3;
pub(crate) const STREAK_BONUS_PCT: u32 = 125;

// Critical hits -------------------------------------------------------------
pub(crate) const CRITICAL_CHANCE: f32 = 0.20;
pub(crate) const CRITICAL_MIN_MULTIPLIER: f32 = 1.5;
pub(crate) const CRITICAL_MAX_MULTIPLIER: f32 = 3.0;

// Milestones ----------------------------------------------------------------
pub(crate) const WEEKLY_CYCLE_DAYS: u32 = 7;
pub(crate) const WEEKLY_STREAK_XP: u64 = 500;
pub(crate) const MONTHLY_MILESTONE_STREAK: u32 = 30;
pub(crate) const MONTHLY_MILESTONE_XP: u64 = 2_500;

// Level curve ---------------------------------------------------------------
pub(crate) const LEVEL_CURVE_BASE: f64 = 100.0;
pub(crate) const LEVEL_CURVE_EXPONENT: f64 = 1.5;

// Statistics ----------------------------------------------------------------
pub(crate) const STATS_TRAILING_DAYS: usize = 30;
pub(crate) const DAYS_PER_WEEK: i64 = 7;

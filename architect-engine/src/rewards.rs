//! Reward tuning configuration and its validation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CRITICAL_CHANCE, CRITICAL_MAX_MULTIPLIER, CRITICAL_MIN_MULTIPLIER, FULL_XP_PCT,
    FULL_XP_THRESHOLD, GRIND_XP_PCT, HALF_XP_PCT, HALF_XP_THRESHOLD, MILLIS_PER_SECOND,
    MONTHLY_MILESTONE_STREAK, MONTHLY_MILESTONE_XP, REPETITION_KEEP_PCT, REPETITION_WINDOW_HOURS,
    STREAK_BONUS_MIN_STREAK, STREAK_BONUS_PCT, STREAK_BONUS_TASK_COUNT, VELOCITY_HISTORY_CAPACITY,
    VELOCITY_MULTIPLIER_PCTS, VELOCITY_WINDOW_SECS, WEEKLY_CYCLE_DAYS, WEEKLY_STREAK_XP,
};
use crate::difficulty::{Difficulty, DifficultyXp};
use crate::levels::LevelCurve;

const DEFAULT_REWARDS_DATA: &str = include_str!("../assets/rewards.json");

/// Complete tuning surface of the progression engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RewardConfig {
    #[serde(default)]
    pub difficulty: DifficultyXp,
    #[serde(default)]
    pub tiers: DailyTiers,
    #[serde(default)]
    pub repetition: RepetitionCfg,
    #[serde(default)]
    pub velocity: VelocityCfg,
    #[serde(default)]
    pub streak_bonus: StreakBonusCfg,
    #[serde(default)]
    pub critical: CriticalCfg,
    #[serde(default)]
    pub milestones: MilestoneCfg,
    #[serde(default)]
    pub level_curve: LevelCurve,
}

impl RewardConfig {
    /// Load the shipped configuration, falling back to compiled defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_REWARDS_DATA).unwrap_or_default()
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or violates a bound.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Base XP for a difficulty tier.
    #[must_use]
    pub const fn base_xp(&self, tier: Difficulty) -> u64 {
        self.difficulty.for_tier(tier)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `RewardConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), RewardConfigError> {
        self.tiers.validate()?;
        self.repetition.validate()?;
        self.velocity.validate()?;
        self.streak_bonus.validate()?;
        self.critical.validate()?;
        self.milestones.validate()?;
        validate_level_curve(&self.level_curve)?;
        Ok(())
    }
}

/// Errors raised when reward configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum RewardConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("daily tier thresholds out of order (full {full} > half {half})")]
    TierOrder { full: u32, half: u32 },
    #[error("velocity multiplier table must not be empty")]
    EmptyMultiplierTable,
}

fn pct_in_range(field: &'static str, value: u32, max: u32) -> Result<(), RewardConfigError> {
    if value > max {
        return Err(RewardConfigError::RangeViolation {
            field,
            min: 0.0,
            max: f64::from(max),
            value: f64::from(value),
        });
    }
    Ok(())
}

fn at_least(field: &'static str, value: u32, min: u32) -> Result<(), RewardConfigError> {
    if value < min {
        return Err(RewardConfigError::MinViolation {
            field,
            min: f64::from(min),
            value: f64::from(value),
        });
    }
    Ok(())
}

fn validate_level_curve(curve: &LevelCurve) -> Result<(), RewardConfigError> {
    if !curve.base.is_finite() || curve.base < 1.0 {
        return Err(RewardConfigError::MinViolation {
            field: "level_curve.base",
            min: 1.0,
            value: curve.base,
        });
    }
    if !curve.exponent.is_finite() || curve.exponent <= 1.0 || curve.exponent > 4.0 {
        return Err(RewardConfigError::RangeViolation {
            field: "level_curve.exponent",
            min: 1.0,
            max: 4.0,
            value: curve.exponent,
        });
    }
    Ok(())
}

/// Diminishing returns by how many tasks were already completed today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTiers {
    #[serde(default = "DailyTiers::default_full_threshold")]
    pub full_threshold: u32,
    #[serde(default = "DailyTiers::default_half_threshold")]
    pub half_threshold: u32,
    #[serde(default = "DailyTiers::default_full_pct")]
    pub full_pct: u32,
    #[serde(default = "DailyTiers::default_half_pct")]
    pub half_pct: u32,
    #[serde(default = "DailyTiers::default_grind_pct")]
    pub grind_pct: u32,
}

impl DailyTiers {
    const fn default_full_threshold() -> u32 {
        FULL_XP_THRESHOLD
    }

    const fn default_half_threshold() -> u32 {
        HALF_XP_THRESHOLD
    }

    const fn default_full_pct() -> u32 {
        FULL_XP_PCT
    }

    const fn default_half_pct() -> u32 {
        HALF_XP_PCT
    }

    const fn default_grind_pct() -> u32 {
        GRIND_XP_PCT
    }

    /// Percentage of base XP for a pre-increment daily count.
    #[must_use]
    pub const fn pct_for(&self, completed_today: u32) -> u32 {
        if completed_today < self.full_threshold {
            self.full_pct
        } else if completed_today < self.half_threshold {
            self.half_pct
        } else {
            self.grind_pct
        }
    }

    fn validate(&self) -> Result<(), RewardConfigError> {
        if self.full_threshold > self.half_threshold {
            return Err(RewardConfigError::TierOrder {
                full: self.full_threshold,
                half: self.half_threshold,
            });
        }
        pct_in_range("tiers.full_pct", self.full_pct, 100)?;
        pct_in_range("tiers.half_pct", self.half_pct, 100)?;
        pct_in_range("tiers.grind_pct", self.grind_pct, 100)?;
        Ok(())
    }
}

impl Default for DailyTiers {
    fn default() -> Self {
        Self {
            full_threshold: Self::default_full_threshold(),
            half_threshold: Self::default_half_threshold(),
            full_pct: Self::default_full_pct(),
            half_pct: Self::default_half_pct(),
            grind_pct: Self::default_grind_pct(),
        }
    }
}

/// Penalty for repeating a task title inside a trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionCfg {
    #[serde(default = "RepetitionCfg::default_window_hours")]
    pub window_hours: u32,
    #[serde(default = "RepetitionCfg::default_keep_pct")]
    pub keep_pct: u32,
}

impl RepetitionCfg {
    const fn default_window_hours() -> u32 {
        REPETITION_WINDOW_HOURS
    }

    const fn default_keep_pct() -> u32 {
        REPETITION_KEEP_PCT
    }

    #[must_use]
    pub fn window_millis(&self) -> i64 {
        i64::from(self.window_hours) * 3_600 * MILLIS_PER_SECOND
    }

    fn validate(&self) -> Result<(), RewardConfigError> {
        at_least("repetition.window_hours", self.window_hours, 1)?;
        pct_in_range("repetition.keep_pct", self.keep_pct, 100)
    }
}

impl Default for RepetitionCfg {
    fn default() -> Self {
        Self {
            window_hours: Self::default_window_hours(),
            keep_pct: Self::default_keep_pct(),
        }
    }
}

/// Damping for completions landing in rapid succession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityCfg {
    #[serde(default = "VelocityCfg::default_window_secs")]
    pub window_secs: u32,
    #[serde(default = "VelocityCfg::default_capacity")]
    pub capacity: usize,
    /// Multiplier indexed by the number of other completions in the window.
    #[serde(default = "VelocityCfg::default_multiplier_pcts")]
    pub multiplier_pcts: Vec<u32>,
}

impl VelocityCfg {
    const fn default_window_secs() -> u32 {
        VELOCITY_WINDOW_SECS
    }

    const fn default_capacity() -> usize {
        VELOCITY_HISTORY_CAPACITY
    }

    fn default_multiplier_pcts() -> Vec<u32> {
        VELOCITY_MULTIPLIER_PCTS.to_vec()
    }

    #[must_use]
    pub fn window_millis(&self) -> i64 {
        i64::from(self.window_secs) * MILLIS_PER_SECOND
    }

    /// Multiplier for `others` earlier completions in the window; the last entry repeats.
    #[must_use]
    pub fn pct_for(&self, others: usize) -> u32 {
        self.multiplier_pcts
            .get(others)
            .or_else(|| self.multiplier_pcts.last())
            .copied()
            .unwrap_or(100)
    }

    fn validate(&self) -> Result<(), RewardConfigError> {
        if self.multiplier_pcts.is_empty() {
            return Err(RewardConfigError::EmptyMultiplierTable);
        }
        if self.capacity == 0 {
            return Err(RewardConfigError::MinViolation {
                field: "velocity.capacity",
                min: 1.0,
                value: 0.0,
            });
        }
        for pct in &self.multiplier_pcts {
            pct_in_range("velocity.multiplier_pcts", *pct, 100)?;
        }
        Ok(())
    }
}

impl Default for VelocityCfg {
    fn default() -> Self {
        Self {
            window_secs: Self::default_window_secs(),
            capacity: Self::default_capacity(),
            multiplier_pcts: Self::default_multiplier_pcts(),
        }
    }
}

/// Bonus on the first tasks of the day while a streak is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakBonusCfg {
    #[serde(default = "StreakBonusCfg::default_min_streak")]
    pub min_streak: u32,
    #[serde(default = "StreakBonusCfg::default_task_count")]
    pub task_count: u32,
    #[serde(default = "StreakBonusCfg::default_pct")]
    pub pct: u32,
}

impl StreakBonusCfg {
    const fn default_min_streak() -> u32 {
        STREAK_BONUS_MIN_STREAK
    }

    const fn default_task_count() -> u32 {
        STREAK_BONUS_TASK_COUNT
    }

    const fn default_pct() -> u32 {
        STREAK_BONUS_PCT
    }

    #[must_use]
    pub const fn applies(&self, daily_streak: u32, completed_today: u32) -> bool {
        daily_streak >= self.min_streak && completed_today < self.task_count
    }

    fn validate(&self) -> Result<(), RewardConfigError> {
        at_least("streak_bonus.pct", self.pct, 100)?;
        pct_in_range("streak_bonus.pct", self.pct, 400)
    }
}

impl Default for StreakBonusCfg {
    fn default() -> Self {
        Self {
            min_streak: Self::default_min_streak(),
            task_count: Self::default_task_count(),
            pct: Self::default_pct(),
        }
    }
}

/// Randomized critical-hit multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalCfg {
    #[serde(default = "CriticalCfg::default_chance")]
    pub chance: f32,
    #[serde(default = "CriticalCfg::default_min_multiplier")]
    pub min_multiplier: f32,
    #[serde(default = "CriticalCfg::default_max_multiplier")]
    pub max_multiplier: f32,
}

impl CriticalCfg {
    const fn default_chance() -> f32 {
        CRITICAL_CHANCE
    }

    const fn default_min_multiplier() -> f32 {
        CRITICAL_MIN_MULTIPLIER
    }

    const fn default_max_multiplier() -> f32 {
        CRITICAL_MAX_MULTIPLIER
    }

    /// Map a unit roll onto `[min_multiplier, max_multiplier)`.
    #[must_use]
    pub fn multiplier_for(&self, roll: f32) -> f64 {
        let span = f64::from(self.max_multiplier) - f64::from(self.min_multiplier);
        f64::from(self.min_multiplier) + f64::from(roll.clamp(0.0, 1.0)) * span
    }

    fn validate(&self) -> Result<(), RewardConfigError> {
        if !(0.0..=1.0).contains(&self.chance) {
            return Err(RewardConfigError::RangeViolation {
                field: "critical.chance",
                min: 0.0,
                max: 1.0,
                value: f64::from(self.chance),
            });
        }
        if !self.min_multiplier.is_finite() || self.min_multiplier < 1.0 {
            return Err(RewardConfigError::MinViolation {
                field: "critical.min_multiplier",
                min: 1.0,
                value: f64::from(self.min_multiplier),
            });
        }
        if !self.max_multiplier.is_finite() || self.max_multiplier <= self.min_multiplier {
            return Err(RewardConfigError::MinViolation {
                field: "critical.max_multiplier",
                min: f64::from(self.min_multiplier),
                value: f64::from(self.max_multiplier),
            });
        }
        Ok(())
    }
}

impl Default for CriticalCfg {
    fn default() -> Self {
        Self {
            chance: Self::default_chance(),
            min_multiplier: Self::default_min_multiplier(),
            max_multiplier: Self::default_max_multiplier(),
        }
    }
}

/// Streak milestone payouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneCfg {
    #[serde(default = "MilestoneCfg::default_weekly_cycle_days")]
    pub weekly_cycle_days: u32,
    #[serde(default = "MilestoneCfg::default_weekly_xp")]
    pub weekly_xp: u64,
    #[serde(default = "MilestoneCfg::default_monthly_streak")]
    pub monthly_streak: u32,
    #[serde(default = "MilestoneCfg::default_monthly_xp")]
    pub monthly_xp: u64,
}

impl MilestoneCfg {
    const fn default_weekly_cycle_days() -> u32 {
        WEEKLY_CYCLE_DAYS
    }

    const fn default_weekly_xp() -> u64 {
        WEEKLY_STREAK_XP
    }

    const fn default_monthly_streak() -> u32 {
        MONTHLY_MILESTONE_STREAK
    }

    const fn default_monthly_xp() -> u64 {
        MONTHLY_MILESTONE_XP
    }

    fn validate(&self) -> Result<(), RewardConfigError> {
        at_least("milestones.weekly_cycle_days", self.weekly_cycle_days, 1)?;
        at_least("milestones.monthly_streak", self.monthly_streak, 1)
    }
}

impl Default for MilestoneCfg {
    fn default() -> Self {
        Self {
            weekly_cycle_days: Self::default_weekly_cycle_days(),
            weekly_xp: Self::default_weekly_xp(),
            monthly_streak: Self::default_monthly_streak(),
            monthly_xp: Self::default_monthly_xp(),
        }
    }
}

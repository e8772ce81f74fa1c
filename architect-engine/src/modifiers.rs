//! Per-task XP modifier pipeline.
//!
//! Stages run in a fixed order and each consumes the previous stage's XP:
//! daily tiering, repetition penalty, velocity damping, streak bonus, and the
//! critical-hit roll. Reordering the multipliers changes truncation results.
use serde::{Deserialize, Serialize};

use crate::numbers::{scale_pct, scale_truncate};
use crate::rewards::RewardConfig;
use crate::rolls::RollSource;

/// Inputs for a single reward calculation, already resolved against state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardInputs {
    pub base_xp: u64,
    /// Tasks completed today before this one.
    pub completed_today: u32,
    /// Streak after the streak transition for this completion.
    pub daily_streak: u32,
    pub is_repeat: bool,
    /// Completions inside the velocity window, this one included.
    pub burst_count: usize,
}

/// XP after every stage, kept for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub base: u64,
    pub tiered: u64,
    pub after_repetition: u64,
    pub after_velocity: u64,
    pub after_streak: u64,
    pub awarded: u64,
    pub is_repeat: bool,
    pub streak_bonus: bool,
    pub is_critical: bool,
    pub critical_multiplier: Option<f64>,
}

/// Run the modifier pipeline for one completion.
pub fn compute_reward<R>(cfg: &RewardConfig, inputs: RewardInputs, rolls: &mut R) -> RewardBreakdown
where
    R: RollSource + ?Sized,
{
    let tiered = scale_pct(inputs.base_xp, cfg.tiers.pct_for(inputs.completed_today));
    log::debug!(
        "tiering: base {} at daily count {} -> {tiered}",
        inputs.base_xp,
        inputs.completed_today
    );

    let after_repetition = if inputs.is_repeat {
        scale_pct(tiered, cfg.repetition.keep_pct)
    } else {
        tiered
    };
    if inputs.is_repeat {
        log::debug!("repetition: {tiered} -> {after_repetition}");
    }

    let others = inputs.burst_count.saturating_sub(1);
    let after_velocity = scale_pct(after_repetition, cfg.velocity.pct_for(others));
    log::debug!(
        "velocity: {} in window -> {after_repetition} -> {after_velocity}",
        inputs.burst_count
    );

    let streak_bonus = cfg
        .streak_bonus
        .applies(inputs.daily_streak, inputs.completed_today);
    let after_streak = if streak_bonus {
        scale_pct(after_velocity, cfg.streak_bonus.pct)
    } else {
        after_velocity
    };
    if streak_bonus {
        log::debug!(
            "streak bonus: streak {} -> {after_velocity} -> {after_streak}",
            inputs.daily_streak
        );
    }

    let critical_multiplier = if inputs.is_repeat {
        None
    } else {
        roll_critical(cfg, rolls)
    };
    let awarded = critical_multiplier.map_or(after_streak, |multiplier| {
        scale_truncate(after_streak, multiplier)
    });
    if let Some(multiplier) = critical_multiplier {
        log::debug!("critical hit: x{multiplier:.3} -> {after_streak} -> {awarded}");
    }

    RewardBreakdown {
        base: inputs.base_xp,
        tiered,
        after_repetition,
        after_velocity,
        after_streak,
        awarded,
        is_repeat: inputs.is_repeat,
        streak_bonus,
        is_critical: critical_multiplier.is_some(),
        critical_multiplier,
    }
}

fn roll_critical<R>(cfg: &RewardConfig, rolls: &mut R) -> Option<f64>
where
    R: RollSource + ?Sized,
{
    if rolls.next_unit() >= cfg.critical.chance {
        return None;
    }
    Some(cfg.critical.multiplier_for(rolls.next_unit()))
}

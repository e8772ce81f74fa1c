//! Task completion and reversion against a progression snapshot.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::EngineError;
use crate::levels::LevelProgress;
use crate::modifiers::{RewardBreakdown, RewardInputs, compute_reward};
use crate::progression::{EpochMillis, UserProgression, epoch_day};
use crate::rewards::{RewardConfig, RewardConfigError};
use crate::rolls::RollSource;
use crate::streak::{StreakTransition, advance_streak};
use crate::task::{RecentCompletion, TaskRecord, is_repeat};
use crate::velocity::VelocityWindow;

/// Milestone payouts fired by one completion; at most weekly plus monthly.
pub type PayoutSet = SmallVec<[Payout; 2]>;

/// Which streak milestone paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutKind {
    Weekly,
    Monthly,
}

/// A single milestone payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub kind: PayoutKind,
    pub xp: u64,
    pub streak: u32,
}

/// Summary for the XP pop-up shown after a completion or revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpToast {
    pub amount: i64,
    pub highlighted: bool,
}

/// Everything the engine needs for one completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub progression: &'a UserProgression,
    pub task: &'a TaskRecord,
    pub recent: &'a [RecentCompletion],
    pub velocity: &'a VelocityWindow,
    pub now: EpochMillis,
}

/// Result of a completion: new snapshots plus the XP delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub progression: UserProgression,
    pub task: TaskRecord,
    pub velocity: VelocityWindow,
    pub awarded_xp: u64,
    pub is_critical: bool,
    pub is_repeat: bool,
    /// Weekly plus monthly payouts.
    pub bonus_xp: u64,
    pub payouts: PayoutSet,
    pub levels_gained: u32,
    pub streak: StreakTransition,
    pub breakdown: RewardBreakdown,
}

impl CompletionOutcome {
    #[must_use]
    pub fn toast(&self) -> XpToast {
        let total = self.awarded_xp.saturating_add(self.bonus_xp);
        XpToast {
            amount: i64::try_from(total).unwrap_or(i64::MAX),
            highlighted: self.is_critical || self.bonus_xp > 0,
        }
    }
}

/// Result of reverting a completed task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevertOutcome {
    pub progression: UserProgression,
    pub task: TaskRecord,
    /// Base difficulty XP deducted before clamping.
    pub xp_removed: u64,
}

impl RevertOutcome {
    #[must_use]
    pub fn toast(&self) -> XpToast {
        XpToast {
            amount: i64::try_from(self.xp_removed).map_or(i64::MIN, |xp| -xp),
            highlighted: false,
        }
    }
}

/// Stateless reward engine bound to a reward configuration.
#[derive(Debug, Clone, Default)]
pub struct ProgressionEngine {
    cfg: RewardConfig,
}

impl ProgressionEngine {
    /// Bind an engine to `cfg` once it passes validation.
    ///
    /// # Errors
    ///
    /// Returns `RewardConfigError` when `cfg` violates its documented bounds, such as
    /// a level curve whose requirement rounds to zero.
    pub fn new(cfg: RewardConfig) -> Result<Self, RewardConfigError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    #[must_use]
    pub const fn config(&self) -> &RewardConfig {
        &self.cfg
    }

    /// A velocity window sized for this configuration.
    #[must_use]
    pub fn new_velocity_window(&self) -> VelocityWindow {
        VelocityWindow::with_capacity(self.cfg.velocity.capacity)
    }

    /// Award XP for completing `request.task` at `request.now`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDifficulty` when the task's tier label is unknown;
    /// nothing is computed in that case.
    pub fn complete_task<R>(
        &self,
        request: CompletionRequest<'_>,
        rolls: &mut R,
    ) -> Result<CompletionOutcome, EngineError>
    where
        R: RollSource + ?Sized,
    {
        let tier = request.task.tier()?;
        let now = request.now;
        let today = epoch_day(now);

        let mut progression = request.progression.clone();
        progression.roll_daily_counter(today);
        let streak = advance_streak(
            &mut progression,
            today,
            self.cfg.milestones.weekly_cycle_days,
        );

        let repeat = is_repeat(
            &request.task.title,
            request.recent,
            now,
            self.cfg.repetition.window_millis(),
        );

        let mut velocity = request.velocity.clone();
        velocity.record(now);
        let burst_count = velocity.burst_count(now, self.cfg.velocity.window_millis());

        let breakdown = compute_reward(
            &self.cfg,
            RewardInputs {
                base_xp: self.cfg.base_xp(tier),
                completed_today: progression.tasks_completed_today,
                daily_streak: progression.daily_streak,
                is_repeat: repeat,
                burst_count,
            },
            rolls,
        );
        let awarded_xp = breakdown.awarded;

        progression.credit(awarded_xp);
        progression.tasks_completed_today = progression.tasks_completed_today.saturating_add(1);
        let mut levels_gained = self.cfg.level_curve.resolve_level_ups(&mut progression);

        let payouts = self.pay_milestones(&mut progression, &mut levels_gained);
        let bonus_xp: u64 = payouts.iter().map(|payout| payout.xp).sum();

        let mut task = request.task.clone();
        task.mark_completed(now);

        log::debug!(
            "completed '{}' ({tier}): +{awarded_xp} xp, +{bonus_xp} bonus, streak {} ({streak:?})",
            task.title,
            progression.daily_streak
        );

        Ok(CompletionOutcome {
            progression,
            task,
            velocity,
            awarded_xp,
            is_critical: breakdown.is_critical,
            is_repeat: repeat,
            bonus_xp,
            payouts,
            levels_gained,
            streak,
            breakdown,
        })
    }

    fn pay_milestones(&self, progression: &mut UserProgression, levels: &mut u32) -> PayoutSet {
        let milestones = &self.cfg.milestones;
        let mut payouts = PayoutSet::new();
        let streak = progression.daily_streak;

        if streak > 0
            && streak.checked_rem(milestones.weekly_cycle_days) == Some(0)
            && !progression.weekly_streak_claimed
        {
            progression.credit(milestones.weekly_xp);
            progression.weekly_streak_claimed = true;
            *levels += self.cfg.level_curve.resolve_level_ups(progression);
            log::info!("weekly streak payout: +{} at streak {streak}", milestones.weekly_xp);
            payouts.push(Payout {
                kind: PayoutKind::Weekly,
                xp: milestones.weekly_xp,
                streak,
            });
        }

        if streak >= milestones.monthly_streak && !progression.monthly_milestone_claimed {
            progression.credit(milestones.monthly_xp);
            progression.monthly_milestone_claimed = true;
            *levels += self.cfg.level_curve.resolve_level_ups(progression);
            log::info!("monthly milestone payout: +{} at streak {streak}", milestones.monthly_xp);
            payouts.push(Payout {
                kind: PayoutKind::Monthly,
                xp: milestones.monthly_xp,
                streak,
            });
        }

        payouts
    }

    /// Un-complete a task, deducting its base difficulty XP.
    ///
    /// The deduction is the tier's base value, not the amount originally awarded.
    /// Streak, level, and milestone state are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDifficulty` when the task's tier label is unknown.
    pub fn revert_task(
        &self,
        progression: &UserProgression,
        task: &TaskRecord,
    ) -> Result<RevertOutcome, EngineError> {
        let tier = task.tier()?;
        let xp_removed = self.cfg.base_xp(tier);

        let mut progression = progression.clone();
        progression.debit(xp_removed);

        let mut task = task.clone();
        task.mark_pending();

        log::debug!("reverted '{}' ({tier}): -{xp_removed} xp", task.title);

        Ok(RevertOutcome {
            progression,
            task,
            xp_removed,
        })
    }

    #[must_use]
    pub fn level_progress(&self, progression: &UserProgression) -> LevelProgress {
        self.cfg.level_curve.progress(progression)
    }

    /// XP required to clear `level` under this configuration.
    #[must_use]
    pub fn xp_required_for_level(&self, level: u32) -> u64 {
        self.cfg.level_curve.xp_required(level)
    }
}

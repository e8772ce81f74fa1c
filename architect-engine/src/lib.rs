//! Life Architect Progression Engine
//!
//! Reward calculation and progression for a gamified task tracker: XP awards with
//! diminishing returns and anti-spam damping, daily streaks, milestone payouts,
//! and level-ups. The engine performs no I/O; storage and time come from the
//! collaborator traits defined here.

pub mod constants;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod levels;
pub mod memory;
pub mod modifiers;
pub mod numbers;
pub mod progression;
pub mod rewards;
pub mod rolls;
pub mod stats;
pub mod streak;
pub mod task;
pub mod tracker;
pub mod velocity;

// Re-export commonly used types
pub use difficulty::{Difficulty, DifficultyXp};
pub use engine::{
    CompletionOutcome, CompletionRequest, Payout, PayoutKind, PayoutSet, ProgressionEngine,
    RevertOutcome, XpToast,
};
pub use error::{EngineError, TrackerError};
pub use levels::{LevelCurve, LevelProgress, rank_title};
pub use memory::{ManualClock, MemoryStore, MemoryStoreError, SystemClock};
pub use modifiers::{RewardBreakdown, RewardInputs, compute_reward};
pub use progression::{EpochMillis, UserProgression, epoch_day};
pub use rewards::{
    CriticalCfg, DailyTiers, MilestoneCfg, RepetitionCfg, RewardConfig, RewardConfigError,
    StreakBonusCfg, VelocityCfg,
};
pub use rolls::{RngRolls, RollSource, RollStream, ScriptedRolls};
pub use stats::{BucketCount, CompletionStats, completion_stats};
pub use streak::{StreakTransition, advance_streak};
pub use task::{RecentCompletion, TaskRecord, TaskStatus, is_repeat, normalize_title};
pub use tracker::ProgressionTracker;
pub use velocity::VelocityWindow;

/// Read/write access to task records.
pub trait TaskStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a task by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_task(&self, task_id: &str) -> Result<Option<TaskRecord>, Self::Error>;

    /// Persist a status change and its completion time.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is missing or the write fails.
    fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        completed_at: Option<EpochMillis>,
    ) -> Result<(), Self::Error>;
}

/// Read/write access to per-user progression snapshots.
pub trait ProgressionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a user's progression; `None` for users that never completed anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_progression(&self, user_id: &str) -> Result<Option<UserProgression>, Self::Error>;

    /// Persist a user's progression.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save_progression(
        &self,
        user_id: &str,
        progression: &UserProgression,
    ) -> Result<(), Self::Error>;
}

/// Source of recently completed titles for repetition detection.
pub trait CompletionHistory {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Completions by `user_id` at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn completions_within(
        &self,
        user_id: &str,
        since: EpochMillis,
    ) -> Result<Vec<RecentCompletion>, Self::Error>;
}

/// Injectable time source.
pub trait Clock {
    fn now(&self) -> EpochMillis;
}

//! Per-user serialized service wiring the engine to its collaborators.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::{CompletionOutcome, CompletionRequest, ProgressionEngine, RevertOutcome};
use crate::error::TrackerError;
use crate::levels::LevelProgress;
use crate::progression::UserProgression;
use crate::rewards::{RewardConfig, RewardConfigError};
use crate::rolls::{RollSource, RollStream};
use crate::task::TaskRecord;
use crate::velocity::VelocityWindow;
use crate::{Clock, CompletionHistory, ProgressionStore, TaskStore};

/// Session memory that must stay consistent with the stored progression.
#[derive(Debug)]
struct UserSession {
    velocity: VelocityWindow,
    rolls: RollStream,
}

/// Drives completions and reverts for many users.
///
/// Calls for the same user are serialized behind that user's session lock;
/// different users proceed independently.
pub struct ProgressionTracker<S, C> {
    engine: ProgressionEngine,
    store: S,
    clock: C,
    seed: u64,
    sessions: Mutex<HashMap<String, Arc<Mutex<UserSession>>>>,
}

impl<S, C> ProgressionTracker<S, C>
where
    S: TaskStore + ProgressionStore + CompletionHistory,
    C: Clock,
{
    /// Create a tracker; `seed` feeds every user's critical-hit stream.
    ///
    /// # Errors
    ///
    /// Returns `RewardConfigError` when `cfg` fails validation.
    pub fn new(
        cfg: RewardConfig,
        store: S,
        clock: C,
        seed: u64,
    ) -> Result<Self, RewardConfigError> {
        Ok(Self {
            engine: ProgressionEngine::new(cfg)?,
            store,
            clock,
            seed,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub const fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Complete a task using the user's seeded critical-hit stream.
    ///
    /// # Errors
    ///
    /// Fails when the task is unknown, belongs to another user, is already
    /// completed, has an invalid difficulty, or a store call fails.
    ///
    /// Progression is written before the task status. When the status write
    /// fails the previous progression is written back so a retry does not award
    /// the XP twice; if that rollback also fails the credit stays behind on a
    /// pending task and is logged at `error`.
    pub fn complete_task(
        &self,
        user_id: &str,
        task_id: &str,
    ) -> Result<CompletionOutcome, TrackerError> {
        let session = self.session_for(user_id, task_id)?;
        let mut session = lock(&session);
        let UserSession { velocity, rolls } = &mut *session;
        let outcome = self.complete_locked(user_id, task_id, velocity, rolls)?;
        *velocity = outcome.velocity.clone();
        Ok(outcome)
    }

    /// Complete a task drawing criticals from `rolls` instead of the session stream.
    ///
    /// # Errors
    ///
    /// Same as [`Self::complete_task`].
    pub fn complete_task_with<R>(
        &self,
        user_id: &str,
        task_id: &str,
        rolls: &mut R,
    ) -> Result<CompletionOutcome, TrackerError>
    where
        R: RollSource + ?Sized,
    {
        let session = self.session_for(user_id, task_id)?;
        let mut session = lock(&session);
        let outcome = self.complete_locked(user_id, task_id, &session.velocity, rolls)?;
        session.velocity = outcome.velocity.clone();
        Ok(outcome)
    }

    fn complete_locked<R>(
        &self,
        user_id: &str,
        task_id: &str,
        velocity: &VelocityWindow,
        rolls: &mut R,
    ) -> Result<CompletionOutcome, TrackerError>
    where
        R: RollSource + ?Sized,
    {
        let task = self.load_task(user_id, task_id)?;
        if task.is_completed() {
            log::warn!("rejecting completion of already completed task {task_id}");
            return Err(TrackerError::TaskAlreadyCompleted {
                task_id: task_id.to_string(),
            });
        }

        let progression = self.load_progression(user_id)?;
        let now = self.clock.now();
        let since = now.saturating_sub(self.engine.config().repetition.window_millis());
        let recent = self
            .store
            .completions_within(user_id, since)
            .map_err(TrackerError::store)?;

        let outcome = self.engine.complete_task(
            CompletionRequest {
                progression: &progression,
                task: &task,
                recent: &recent,
                velocity,
                now,
            },
            rolls,
        )?;

        self.persist(user_id, &progression, &outcome.progression, &outcome.task)?;
        Ok(outcome)
    }

    /// Revert a completed task back to pending.
    ///
    /// # Errors
    ///
    /// Fails when the task is unknown, belongs to another user, is still pending,
    /// has an invalid difficulty, or a store call fails. A failed status write
    /// restores the previous progression as in [`Self::complete_task`].
    pub fn revert_task(&self, user_id: &str, task_id: &str) -> Result<RevertOutcome, TrackerError> {
        let session = self.session_for(user_id, task_id)?;
        let _guard = lock(&session);

        let task = self.load_task(user_id, task_id)?;
        if !task.is_completed() {
            log::warn!("rejecting revert of pending task {task_id}");
            return Err(TrackerError::TaskNotCompleted {
                task_id: task_id.to_string(),
            });
        }
        let progression = self.load_progression(user_id)?;
        let outcome = self.engine.revert_task(&progression, &task)?;

        self.persist(user_id, &progression, &outcome.progression, &outcome.task)?;
        Ok(outcome)
    }

    /// Drop the session memory for `user_id`.
    ///
    /// The next call for this user starts a fresh velocity window and restarts the
    /// critical-hit stream from its seed. Returns whether a session existed.
    pub fn end_session(&self, user_id: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user_id)
            .is_some()
    }

    /// Number of users with live session memory.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Stored progression for `user_id`, or the default for new users.
    ///
    /// # Errors
    ///
    /// Propagates progression store failures.
    pub fn progression(&self, user_id: &str) -> Result<UserProgression, TrackerError> {
        self.load_progression(user_id)
    }

    /// Level, rank, and in-level progress for `user_id`.
    ///
    /// # Errors
    ///
    /// Propagates progression store failures.
    pub fn level_progress(&self, user_id: &str) -> Result<LevelProgress, TrackerError> {
        let progression = self.load_progression(user_id)?;
        Ok(self.engine.level_progress(&progression))
    }

    fn load_task(&self, user_id: &str, task_id: &str) -> Result<TaskRecord, TrackerError> {
        self.store
            .get_task(task_id)
            .map_err(TrackerError::store)?
            .filter(|task| task.user_id == user_id)
            .ok_or_else(|| TrackerError::UnknownTask {
                user_id: user_id.to_string(),
                task_id: task_id.to_string(),
            })
    }

    fn persist(
        &self,
        user_id: &str,
        previous: &UserProgression,
        progression: &UserProgression,
        task: &TaskRecord,
    ) -> Result<(), TrackerError> {
        self.store
            .save_progression(user_id, progression)
            .map_err(TrackerError::store)?;
        if let Err(err) = self
            .store
            .update_task_status(&task.id, task.status, task.completed_at)
        {
            log::warn!(
                "status write for task {} failed; restoring progression for {user_id}",
                task.id
            );
            if let Err(rollback) = self.store.save_progression(user_id, previous) {
                log::error!("progression rollback for {user_id} failed: {rollback}");
            }
            return Err(TrackerError::store(err));
        }
        Ok(())
    }

    fn load_progression(&self, user_id: &str) -> Result<UserProgression, TrackerError> {
        Ok(self
            .store
            .get_progression(user_id)
            .map_err(TrackerError::store)?
            .unwrap_or_default())
    }

    // Ownership is checked before a session exists; status is re-read under the lock.
    fn session_for(
        &self,
        user_id: &str,
        task_id: &str,
    ) -> Result<Arc<Mutex<UserSession>>, TrackerError> {
        self.load_task(user_id, task_id)?;
        Ok(self.session(user_id))
    }

    fn session(&self, user_id: &str) -> Arc<Mutex<UserSession>> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(sessions.entry(user_id.to_string()).or_insert_with(|| {
            Arc::new(Mutex::new(UserSession {
                velocity: self.engine.new_velocity_window(),
                rolls: RollStream::from_user_seed(self.seed, user_id.as_bytes()),
            }))
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

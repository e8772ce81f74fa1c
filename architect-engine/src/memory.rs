//! In-memory collaborators and clocks.
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

use crate::progression::{EpochMillis, UserProgression};
use crate::task::{RecentCompletion, TaskRecord, TaskStatus};
use crate::{Clock, CompletionHistory, ProgressionStore, TaskStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("no task with id {0}")]
    MissingTask(String),
}

/// Thread-safe store for tasks and progression snapshots, keyed by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<String, TaskRecord>>,
    progressions: RwLock<HashMap<String, UserProgression>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a task record.
    pub fn insert_task(&self, task: TaskRecord) {
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task.id.clone(), task);
    }

    /// Every task owned by `user_id`, oldest first.
    #[must_use]
    pub fn tasks_for_user(&self, user_id: &str) -> Vec<TaskRecord> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<TaskRecord> = tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        owned
    }
}

impl TaskStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get_task(&self, task_id: &str) -> Result<Option<TaskRecord>, Self::Error> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks.get(task_id).cloned())
    }

    fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        completed_at: Option<EpochMillis>,
    ) -> Result<(), Self::Error> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let task = tasks
            .get_mut(task_id)
            .ok_or_else(|| MemoryStoreError::MissingTask(task_id.to_string()))?;
        task.status = status;
        task.completed_at = completed_at;
        Ok(())
    }
}

impl ProgressionStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get_progression(&self, user_id: &str) -> Result<Option<UserProgression>, Self::Error> {
        let progressions = self
            .progressions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(progressions.get(user_id).cloned())
    }

    fn save_progression(
        &self,
        user_id: &str,
        progression: &UserProgression,
    ) -> Result<(), Self::Error> {
        self.progressions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), progression.clone());
        Ok(())
    }
}

impl CompletionHistory for MemoryStore {
    type Error = MemoryStoreError;

    fn completions_within(
        &self,
        user_id: &str,
        since: EpochMillis,
    ) -> Result<Vec<RecentCompletion>, Self::Error> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks
            .values()
            .filter(|task| task.user_id == user_id && task.is_completed())
            .filter_map(TaskRecord::as_recent)
            .filter(|entry| entry.completed_at >= since)
            .collect())
    }
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMillis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Settable clock for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub const fn new(now: EpochMillis) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: EpochMillis) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock by `delta` milliseconds (negative values move it back).
    pub fn advance(&self, delta: i64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochMillis {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;

    #[test]
    fn tasks_round_trip_through_store() {
        let store = MemoryStore::new();
        let task = TaskRecord::new("alice", "Read", Difficulty::Easy, 1);
        let id = task.id.clone();
        store.insert_task(task);
        store.insert_task(TaskRecord::new("bob", "Run", Difficulty::Hard, 2));

        store
            .update_task_status(&id, TaskStatus::Completed, Some(50))
            .unwrap();
        let loaded = store.get_task(&id).unwrap().unwrap();
        assert!(loaded.is_completed());
        assert_eq!(loaded.completed_at, Some(50));
        assert_eq!(store.tasks_for_user("alice").len(), 1);
        assert_eq!(
            store.update_task_status("missing", TaskStatus::Pending, None),
            Err(MemoryStoreError::MissingTask("missing".to_string()))
        );
    }

    #[test]
    fn history_filters_by_user_and_time() {
        let store = MemoryStore::new();
        for (user, title, at) in [("alice", "Old", 10), ("alice", "New", 100), ("bob", "New", 100)] {
            let mut task = TaskRecord::new(user, title, Difficulty::Easy, 0);
            task.mark_completed(at);
            store.insert_task(task);
        }
        store.insert_task(TaskRecord::new("alice", "Pending", Difficulty::Easy, 0));

        let recent = store.completions_within("alice", 50).unwrap();
        assert_eq!(recent, vec![RecentCompletion::new("New", 100)]);
    }

    #[test]
    fn progression_defaults_to_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get_progression("alice").unwrap(), None);
        let progression = UserProgression {
            xp: 10,
            ..UserProgression::default()
        };
        store.save_progression("alice", &progression).unwrap();
        assert_eq!(store.get_progression("alice").unwrap(), Some(progression));
    }

    #[test]
    fn manual_clock_moves_both_ways() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now(), 1_500);
        clock.advance(-2_000);
        assert_eq!(clock.now(), -500);
        clock.set(7);
        assert_eq!(clock.now(), 7);
        assert!(SystemClock.now() > 0);
    }
}

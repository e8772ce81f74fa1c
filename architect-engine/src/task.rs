//! Task records and the recent-completion history used for repetition checks.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::difficulty::Difficulty;
use crate::error::EngineError;
use crate::progression::EpochMillis;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

/// A single user task as held by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Stored difficulty label; parsed on every reward calculation.
    pub difficulty: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub completed_at: Option<EpochMillis>,
    #[serde(default)]
    pub created_at: EpochMillis,
    #[serde(default)]
    pub due_at: Option<EpochMillis>,
}

impl TaskRecord {
    /// Create a pending task with a fresh id.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        difficulty: Difficulty,
        created_at: EpochMillis,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            difficulty: difficulty.as_str().to_string(),
            status: TaskStatus::Pending,
            completed_at: None,
            created_at,
            due_at: None,
        }
    }

    #[must_use]
    pub fn with_due_at(mut self, due_at: EpochMillis) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Parse the stored difficulty label.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDifficulty` for unknown labels.
    pub fn tier(&self) -> Result<Difficulty, EngineError> {
        self.difficulty.parse()
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    pub fn mark_completed(&mut self, at: EpochMillis) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
    }

    pub fn mark_pending(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
    }

    /// History entry for this task, if it carries a completion time.
    #[must_use]
    pub fn as_recent(&self) -> Option<RecentCompletion> {
        self.completed_at
            .map(|at| RecentCompletion::new(self.title.clone(), at))
    }
}

/// A title completed recently, supplied fresh by the caller on every completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCompletion {
    pub title: String,
    pub completed_at: EpochMillis,
}

impl RecentCompletion {
    #[must_use]
    pub fn new(title: impl Into<String>, completed_at: EpochMillis) -> Self {
        Self {
            title: title.into(),
            completed_at,
        }
    }
}

/// Title key used for repetition matching: trimmed and lowercased.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Whether `title` was completed within `window_millis` before `now`.
#[must_use]
pub fn is_repeat(
    title: &str,
    recent: &[RecentCompletion],
    now: EpochMillis,
    window_millis: i64,
) -> bool {
    let key = normalize_title(title);
    recent.iter().any(|entry| {
        let age = now.saturating_sub(entry.completed_at);
        (0..window_millis).contains(&age) && normalize_title(&entry.title) == key
    })
}

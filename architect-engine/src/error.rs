use thiserror::Error;

/// Errors raised by the pure progression engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown difficulty tier `{label}`")]
    InvalidDifficulty { label: String },
}

/// Errors raised by [`crate::ProgressionTracker`] around the engine.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("task {task_id} not found for user {user_id}")]
    UnknownTask { user_id: String, task_id: String },
    #[error("task {task_id} is already completed")]
    TaskAlreadyCompleted { task_id: String },
    #[error("task {task_id} is not completed")]
    TaskNotCompleted { task_id: String },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("storage failure: {0:#}")]
    Store(anyhow::Error),
}

impl TrackerError {
    pub(crate) fn store<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Store(err.into())
    }
}

use thiserror::Error;

/// Errors raised by the board engine and its collaborators.
///
/// Cloneable so that one failed fetch can be handed to every caller that was
/// awaiting the same pending load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Failed to fetch tasks for status {status_id}: {message}")]
    Fetch { status_id: String, message: String },

    #[error("Move of task {task_id} was rejected: {message}")]
    MoveRejected { task_id: String, message: String },

    #[error("Task {task_id} already has a move in flight")]
    ConcurrentMove { task_id: String },

    #[error("Discarded stale fetch for status {status_id} (generation {generation})")]
    StaleFetchDiscarded { status_id: String, generation: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    /// Whether the error should reach the user as a notification.
    ///
    /// Stale fetch discards are bookkeeping only.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, BoardError::StaleFetchDiscarded { .. })
    }

    /// Whether re-issuing the triggering action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BoardError::Fetch { .. } | BoardError::MoveRejected { .. } | BoardError::Io(_)
        )
    }
}

impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        BoardError::Io(err.to_string())
    }
}

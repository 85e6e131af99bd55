use serde::Serialize;
use taskboard_domain::{FilterState, StatusId, TaskId};

/// Inputs a board view feeds to its [`BoardController`](crate::BoardController).
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    FilterChanged(FilterState),
    LoadMore {
        status_id: StatusId,
    },
    DropAccepted {
        task_id: TaskId,
        from_status_id: StatusId,
        to_status_id: StatusId,
    },
    /// Reload every mounted column from page one.
    RefreshAll,
}

/// User-visible outcomes published to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BoardNotice {
    FetchFailed {
        status_id: StatusId,
        message: String,
    },
    MoveRejected {
        task_id: TaskId,
        from_status_id: StatusId,
        to_status_id: StatusId,
        message: String,
    },
    MoveCommitted {
        task_id: TaskId,
        to_status_id: StatusId,
    },
}

impl BoardNotice {
    /// One-line message for a toast or status bar.
    pub fn message(&self) -> String {
        match self {
            BoardNotice::FetchFailed { status_id, message } => {
                format!("Could not load {}: {}", status_id, message)
            }
            BoardNotice::MoveRejected {
                task_id,
                to_status_id,
                message,
                ..
            } => format!("Could not move {} to {}: {}", task_id, to_status_id, message),
            BoardNotice::MoveCommitted {
                task_id,
                to_status_id,
            } => format!("Moved {} to {}", task_id, to_status_id),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, BoardNotice::MoveCommitted { .. })
    }
}

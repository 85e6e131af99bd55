use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskboard_core::{BoardResult, PaginationMeta};
use taskboard_domain::{Task, TaskUpdate};

use crate::fetcher::TaskQuery;

/// One page of a column as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub pagination: PaginationMeta,
}

impl TaskPage {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: PaginationMeta::for_page(page, limit, 0),
        }
    }
}

/// Remote task store the board reads from and writes moves to.
///
/// Implementations own transport, retries and timeouts; the engine only
/// sees the eventual result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Paginated list of tasks for one status column.
    async fn list_tasks(&self, query: &TaskQuery) -> BoardResult<TaskPage>;

    /// Apply a partial update to one task and return the stored result.
    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> BoardResult<Task>;
}

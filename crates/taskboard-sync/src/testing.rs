//! Fixtures shared by the unit tests of this crate.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use taskboard_core::{BoardError, BoardResult, PaginationMeta};
use taskboard_domain::{CompositeFilter, FilterState, StatusFilter, Task, TaskFilter, TaskUpdate};
use tokio::sync::Semaphore;

use crate::fetcher::TaskQuery;
use crate::source::{TaskPage, TaskSource};

pub(crate) fn task(id: &str, status_id: &str) -> Task {
    Task::new(id, status_id, format!("Task {}", id))
}

/// In-memory server: keeps tasks in insertion order and paginates them.
#[derive(Default)]
pub(crate) struct StaticSource {
    tasks: Mutex<Vec<Task>>,
    list_calls: AtomicUsize,
    fail_lists: AtomicBool,
    fail_updates: AtomicBool,
    gate: Option<Semaphore>,
}

impl StaticSource {
    pub(crate) fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Default::default()
        }
    }

    pub(crate) fn with_column(status_id: &str, count: usize) -> Self {
        Self::new(
            (1..=count)
                .map(|n| task(&format!("t{}", n), status_id))
                .collect(),
        )
    }

    /// Hold every list call until [`StaticSource::release`] lets it through.
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub(crate) fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn column(&self, status_id: &str, filter: &FilterState) -> Vec<Task> {
        let matcher = CompositeFilter::new()
            .with_filter(StatusFilter::new(status_id))
            .with_filter(filter);
        self.tasks
            .lock()
            .iter()
            .filter(|t| matcher.matches(t))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TaskSource for StaticSource {
    async fn list_tasks(&self, query: &TaskQuery) -> BoardResult<TaskPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(BoardError::Io("connection refused".to_string()));
        }

        let column = self.column(&query.status_id, &query.filter);
        let total = column.len() as u64;
        let pagination = PaginationMeta::for_page(query.page, query.page_size, total);
        let items = column
            .into_iter()
            .skip(pagination.offset())
            .take(query.page_size as usize)
            .collect();
        Ok(TaskPage { items, pagination })
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> BoardResult<Task> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(BoardError::Internal("update refused".to_string()));
        }
        let mut tasks = self.tasks.lock();
        let stored = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| BoardError::NotFound(format!("task {}", task_id)))?;
        *stored = update.applied_to(stored);
        Ok(stored.clone())
    }
}

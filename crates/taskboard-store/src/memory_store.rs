use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use taskboard_core::{BoardError, BoardResult, PaginationMeta};
use taskboard_domain::{CompositeFilter, StatusFilter, Task, TaskFilter, TaskUpdate};
use taskboard_sync::{TaskPage, TaskQuery, TaskSource};

/// Task source backed by a vector in memory.
///
/// Columns are ordered newest first, ties broken by id. Failures and latency
/// can be injected to exercise the engine's error paths.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
    latency: Option<Duration>,
    fail_lists: AtomicBool,
    fail_next_update: AtomicBool,
    list_calls: AtomicUsize,
}

impl MemoryTaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Default::default()
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Reject the next update only.
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.tasks.lock().iter().find(|t| t.id == task_id).cloned()
    }

    /// Add a task, replacing any stored task with the same id.
    pub fn upsert(&self, task: Task) {
        let mut tasks = self.tasks.lock();
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(stored) => *stored = task,
            None => tasks.push(task),
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl From<Vec<Task>> for MemoryTaskStore {
    fn from(tasks: Vec<Task>) -> Self {
        Self::new(tasks)
    }
}

#[async_trait]
impl TaskSource for MemoryTaskStore {
    async fn list_tasks(&self, query: &TaskQuery) -> BoardResult<TaskPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(BoardError::Io("task list unavailable".to_string()));
        }

        let matcher = CompositeFilter::new()
            .with_filter(StatusFilter::new(query.status_id.clone()))
            .with_filter(&query.filter);
        let mut column: Vec<Task> = self
            .tasks
            .lock()
            .iter()
            .filter(|t| matcher.matches(t))
            .cloned()
            .collect();
        column.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let pagination = PaginationMeta::for_page(query.page, query.page_size, column.len() as u64);
        let items: Vec<Task> = column
            .into_iter()
            .skip(pagination.offset())
            .take(query.page_size as usize)
            .collect();
        tracing::debug!(
            "Listed {} of {} tasks in status {} (page {})",
            items.len(),
            pagination.total,
            query.status_id,
            pagination.page
        );
        Ok(TaskPage { items, pagination })
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> BoardResult<Task> {
        self.simulate_latency().await;
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            tracing::debug!("Injected failure for update of task {}", task_id);
            return Err(BoardError::Io("update rejected by server".to_string()));
        }

        let mut tasks = self.tasks.lock();
        let stored = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| BoardError::NotFound(format!("task {}", task_id)))?;
        *stored = update.applied_to(stored);
        tracing::debug!("Updated task {} (status {})", task_id, stored.status_id);
        Ok(stored.clone())
    }
}

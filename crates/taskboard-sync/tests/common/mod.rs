#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use taskboard_core::{BoardError, BoardResult, PaginationMeta};
use taskboard_domain::{
    CompositeFilter, FilterState, StatusFilter, StatusId, Task, TaskFilter, TaskUpdate,
};
use taskboard_sync::{TaskPage, TaskQuery, TaskSource};
use tokio::sync::Semaphore;

pub fn task(id: &str, status_id: &str) -> Task {
    Task::new(id, status_id, format!("Task {}", id))
}

pub fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

/// Paginating fake server with per-page holds and scripted responses.
#[derive(Default)]
pub struct FakeServer {
    tasks: Mutex<Vec<Task>>,
    scripted: Mutex<HashMap<(StatusId, u32), TaskPage>>,
    holds: Mutex<HashMap<(StatusId, u32), Arc<Semaphore>>>,
    list_calls: AtomicUsize,
    fail_next_update: AtomicBool,
}

impl FakeServer {
    pub fn new(tasks: Vec<Task>) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(tasks),
            ..Default::default()
        })
    }

    /// Answer the next request for `page` of `status_id` with `page_data`.
    pub fn script(&self, status_id: &str, page: u32, page_data: TaskPage) {
        self.scripted
            .lock()
            .insert((status_id.to_string(), page), page_data);
    }

    /// Block requests for `page` of `status_id` until released.
    pub fn hold(&self, status_id: &str, page: u32) {
        self.holds
            .lock()
            .insert((status_id.to_string(), page), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, status_id: &str, page: u32) {
        if let Some(gate) = self.holds.lock().get(&(status_id.to_string(), page)) {
            gate.add_permits(1);
        }
    }

    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// What the server holds for one column under `filter`.
    pub fn column(&self, status_id: &str, filter: &FilterState) -> Vec<Task> {
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
impl TaskSource for FakeServer {
    async fn list_tasks(&self, query: &TaskQuery) -> BoardResult<TaskPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let key = (query.status_id.clone(), query.page);
        let gate = self.holds.lock().get(&key).cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(page) = self.scripted.lock().remove(&key) {
            return Ok(page);
        }

        let column = self.column(&query.status_id, &query.filter);
        let pagination = PaginationMeta::for_page(query.page, query.page_size, column.len() as u64);
        let items = column
            .into_iter()
            .skip(pagination.offset())
            .take(query.page_size as usize)
            .collect();
        Ok(TaskPage { items, pagination })
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> BoardResult<Task> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(BoardError::Io("502 Bad Gateway".to_string()));
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

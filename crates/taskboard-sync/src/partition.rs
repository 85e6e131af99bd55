//! Per-status column cache.
//!
//! A [`Partition`] holds the loaded pages of one status column, its
//! pagination cursor and the single fetch that may be in flight for it.
//! Every [`Partition::reset`] starts a new generation; a fetch that resolves
//! after its generation has been superseded is dropped on arrival.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use taskboard_core::{BoardError, BoardResult, PageCursor};
use taskboard_domain::{FilterState, StatusId, Task, TaskId};

use crate::fetcher::PaginationFetcher;
use crate::source::TaskPage;

type SharedLoad = Shared<BoxFuture<'static, BoardResult<TaskPage>>>;

/// Read model for rendering one column and its "load more" control.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionView {
    pub status_id: StatusId,
    pub items: Vec<Task>,
    pub page: u32,
    pub total: u64,
    /// Server total adjusted by optimistic inserts and removals since the
    /// last load.
    pub display_total: u64,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Label count for "load more", at most one page.
    pub remaining: u64,
}

struct PendingLoad {
    generation: u64,
    page: u32,
    future: SharedLoad,
}

struct PartitionState {
    items: Vec<Task>,
    cursor: PageCursor,
    optimistic_delta: i64,
    generation: u64,
    pending: Option<PendingLoad>,
    filter: FilterState,
    last_error: Option<BoardError>,
}

impl PartitionState {
    fn position(&self, task_id: &str) -> Option<usize> {
        self.items.iter().position(|t| t.id == task_id)
    }

    /// Append the tasks whose ids are not cached yet. Returns how many were
    /// added.
    fn merge(&mut self, incoming: &[Task]) -> usize {
        let mut seen: HashSet<TaskId> = self.items.iter().map(|t| t.id.clone()).collect();
        let before = self.items.len();
        for task in incoming {
            if seen.insert(task.id.clone()) {
                self.items.push(task.clone());
            }
        }
        self.items.len() - before
    }
}

struct PartitionInner {
    status_id: StatusId,
    fetcher: PaginationFetcher,
    state: Mutex<PartitionState>,
}

/// Cheaply cloneable handle to one column cache.
#[derive(Clone)]
pub struct Partition {
    inner: Arc<PartitionInner>,
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Partition")
            .field("status_id", &self.inner.status_id)
            .field("items", &state.items.len())
            .field("cursor", &state.cursor)
            .field("generation", &state.generation)
            .field("fetch_in_flight", &state.pending.is_some())
            .finish()
    }
}

impl Partition {
    pub fn new(
        status_id: impl Into<StatusId>,
        fetcher: PaginationFetcher,
        page_size: u32,
    ) -> Self {
        Self::with_filter(status_id, fetcher, page_size, FilterState::default())
    }

    /// A cache whose reloads use `filter` until its first load records
    /// another one.
    pub fn with_filter(
        status_id: impl Into<StatusId>,
        fetcher: PaginationFetcher,
        page_size: u32,
        filter: FilterState,
    ) -> Self {
        Self {
            inner: Arc::new(PartitionInner {
                status_id: status_id.into(),
                fetcher,
                state: Mutex::new(PartitionState {
                    items: Vec::new(),
                    cursor: PageCursor::new(page_size),
                    optimistic_delta: 0,
                    generation: 0,
                    pending: None,
                    filter,
                    last_error: None,
                }),
            }),
        }
    }

    pub fn status_id(&self) -> &str {
        &self.inner.status_id
    }

    /// Whether both handles point at the same cache.
    pub fn ptr_eq(&self, other: &Partition) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Load `page` of this column under `filter`.
    ///
    /// While a fetch is in flight every call joins it and resolves to the
    /// same result, whatever page it asked for. Page one replaces the cache;
    /// later pages append tasks not already cached. On failure the cache is
    /// left as it was.
    ///
    /// Inside a tokio runtime the fetch runs on its own task, so it still
    /// lands in the cache when every caller stops waiting for it.
    pub async fn load(&self, filter: FilterState, page: u32) -> BoardResult<TaskPage> {
        let (future, started) = {
            let mut state = self.inner.state.lock();
            let in_flight = state.pending.as_ref().map(|p| (p.page, p.future.clone()));
            match in_flight {
                Some((pending_page, future)) => {
                    tracing::debug!(
                        "Status {}: joining in-flight fetch of page {}",
                        self.inner.status_id,
                        pending_page
                    );
                    (future, false)
                }
                None => {
                    let page = page.max(1);
                    let generation = state.generation;
                    let future =
                        self.fetch_future(generation, filter.clone(), page, state.cursor.page_size);
                    state.filter = filter;
                    state.pending = Some(PendingLoad {
                        generation,
                        page,
                        future: future.clone(),
                    });
                    (future, true)
                }
            }
        };
        if started {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(future.clone());
            }
        }
        future.await
    }

    /// Load the page after the last one, under the filter of the last load.
    ///
    /// Returns `Ok(None)` without fetching when the server reported no more
    /// pages, when nothing has been loaded yet, or while a fetch is in flight.
    pub async fn load_more(&self) -> BoardResult<Option<TaskPage>> {
        let (filter, next_page) = {
            let state = self.inner.state.lock();
            if state.pending.is_some() || !state.cursor.has_more() {
                return Ok(None);
            }
            (state.filter.clone(), state.cursor.next_page())
        };
        self.load(filter, next_page).await.map(Some)
    }

    /// Prepend a task unless one with the same id is cached.
    pub fn apply_optimistic_insert(&self, task: Task) -> bool {
        let mut state = self.inner.state.lock();
        if state.position(&task.id).is_some() {
            return false;
        }
        tracing::debug!("Status {}: optimistic insert of {}", self.inner.status_id, task.id);
        state.items.insert(0, task);
        state.optimistic_delta += 1;
        true
    }

    /// Drop a cached task if present.
    pub fn apply_optimistic_removal(&self, task_id: &str) -> bool {
        let mut state = self.inner.state.lock();
        let Some(index) = state.position(task_id) else {
            return false;
        };
        tracing::debug!("Status {}: optimistic removal of {}", self.inner.status_id, task_id);
        state.items.remove(index);
        state.optimistic_delta -= 1;
        true
    }

    /// Forget everything cached and start a new generation.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.items.clear();
        state.cursor.reset();
        state.optimistic_delta = 0;
        state.last_error = None;
        state.pending = None;
        state.generation += 1;
        tracing::debug!(
            "Status {}: reset to generation {}",
            self.inner.status_id,
            state.generation
        );
    }

    /// Reset, then load page one under the filter of the last load.
    pub async fn invalidate_and_reload(&self) -> BoardResult<TaskPage> {
        let filter = self.inner.state.lock().filter.clone();
        self.reset();
        self.load(filter, 1).await
    }

    pub fn view(&self) -> PartitionView {
        let state = self.inner.state.lock();
        let display_total = (state.cursor.total as i64 + state.optimistic_delta).max(0) as u64;
        PartitionView {
            status_id: self.inner.status_id.clone(),
            items: state.items.clone(),
            page: state.cursor.page,
            total: state.cursor.total,
            display_total,
            has_more: state.cursor.has_more(),
            loading: state.pending.is_some(),
            error: state.last_error.as_ref().map(ToString::to_string),
            remaining: state.cursor.remaining_label(state.items.len()),
        }
    }

    pub fn items(&self) -> Vec<Task> {
        self.inner.state.lock().items.clone()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.inner
            .state
            .lock()
            .items
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn find(&self, task_id: &str) -> Option<Task> {
        let state = self.inner.state.lock();
        state.position(task_id).map(|i| state.items[i].clone())
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.inner.state.lock().position(task_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cursor(&self) -> PageCursor {
        self.inner.state.lock().cursor.clone()
    }

    pub fn filter(&self) -> FilterState {
        self.inner.state.lock().filter.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    pub fn last_error(&self) -> Option<BoardError> {
        self.inner.state.lock().last_error.clone()
    }

    fn fetch_future(
        &self,
        generation: u64,
        filter: FilterState,
        page: u32,
        page_size: u32,
    ) -> SharedLoad {
        let fetcher = self.inner.fetcher.clone();
        let status_id = self.inner.status_id.clone();
        let inner = Arc::downgrade(&self.inner);
        async move {
            let result = fetcher.fetch(&status_id, &filter, page, page_size).await;
            match inner.upgrade() {
                Some(inner) => Partition { inner }.finish_load(generation, page, result),
                None => Err(BoardError::StaleFetchDiscarded {
                    status_id,
                    generation,
                }),
            }
        }
        .boxed()
        .shared()
    }

    fn finish_load(
        &self,
        generation: u64,
        page: u32,
        result: BoardResult<TaskPage>,
    ) -> BoardResult<TaskPage> {
        let mut state = self.inner.state.lock();
        if state.generation != generation {
            tracing::debug!(
                "Status {}: discarding page {} from generation {} (current {})",
                self.inner.status_id,
                page,
                generation,
                state.generation
            );
            return Err(BoardError::StaleFetchDiscarded {
                status_id: self.inner.status_id.clone(),
                generation,
            });
        }
        state.pending = None;

        match result {
            Ok(fetched) => {
                if page <= 1 {
                    state.items.clear();
                }
                let added = state.merge(&fetched.items);
                state.cursor.apply(&fetched.pagination);
                state.optimistic_delta = 0;
                state.last_error = None;
                tracing::debug!(
                    "Status {}: page {} added {} of {} tasks ({} cached, {} total)",
                    self.inner.status_id,
                    page,
                    added,
                    fetched.items.len(),
                    state.items.len(),
                    state.cursor.total
                );
                Ok(fetched)
            }
            Err(e) => {
                tracing::warn!(
                    "Status {}: failed to load page {}: {}",
                    self.inner.status_id,
                    page,
                    e
                );
                state.last_error = Some(e.clone());
                Err(e)
            }
        }
    }
}

//! Board-level orchestration.
//!
//! The controller owns the shared [`FilterState`], the set of mounted column
//! caches and the notice channel. Filter changes and refreshes are fanned out
//! to every mounted column concurrently; each column succeeds or fails on its
//! own.

use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use taskboard_core::{AppConfig, BoardError, BoardResult};
use taskboard_domain::{Board, FilterState, StatusId, Task};
use tokio::sync::broadcast;

use crate::coordinator::{MoveCoordinator, PartitionRegistration};
use crate::events::{BoardEvent, BoardNotice};
use crate::fetcher::PaginationFetcher;
use crate::partition::{Partition, PartitionView};
use crate::source::{TaskPage, TaskSource};

const NOTICE_CAPACITY: usize = 64;

/// Result of one column's part in a fan-out.
pub type ColumnOutcome = (StatusId, BoardResult<TaskPage>);

pub struct BoardController {
    board: Board,
    filter: Mutex<FilterState>,
    fetcher: PaginationFetcher,
    coordinator: MoveCoordinator,
    mounts: Mutex<HashMap<StatusId, PartitionRegistration>>,
    page_size: u32,
    notices: broadcast::Sender<BoardNotice>,
}

impl BoardController {
    pub fn new(board: Board, source: Arc<dyn TaskSource>, config: &AppConfig) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            fetcher: PaginationFetcher::new(source.clone(), board.id.clone()),
            coordinator: MoveCoordinator::new(source),
            board,
            filter: Mutex::new(FilterState::default()),
            mounts: Mutex::new(HashMap::new()),
            page_size: config.effective_page_size() as u32,
            notices,
        }
    }

    /// Start from `filter` instead of the empty filter.
    pub fn with_filter(self, filter: FilterState) -> Self {
        *self.filter.lock() = filter;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn coordinator(&self) -> &MoveCoordinator {
        &self.coordinator
    }

    pub fn filter(&self) -> FilterState {
        self.filter.lock().clone()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardNotice> {
        self.notices.subscribe()
    }

    /// Mount the column for `status_id` without loading it. Mounting a
    /// mounted column returns the existing cache.
    pub fn mount(&self, status_id: &str) -> BoardResult<Partition> {
        self.board.require_status(status_id)?;
        let mut mounts = self.mounts.lock();
        let registration = mounts
            .entry(status_id.to_string())
            .or_insert_with(|| self.register(status_id));
        Ok(registration.partition().clone())
    }

    /// Mount every column of the board, collapsed or not.
    pub fn mount_all(&self) -> Vec<StatusId> {
        let ids: Vec<StatusId> = self
            .board
            .ordered_statuses()
            .into_iter()
            .map(|s| s.id.clone())
            .collect();
        let mut mounts = self.mounts.lock();
        for id in &ids {
            if !mounts.contains_key(id) {
                let registration = self.register(id);
                mounts.insert(id.clone(), registration);
            }
        }
        ids
    }

    /// Mount the columns visible under the current filter and unmount the
    /// rest. Returns the visible status ids in board order.
    pub fn mount_visible(&self) -> Vec<StatusId> {
        let filter = self.filter();
        let visible: Vec<StatusId> = self
            .board
            .visible_statuses(&filter)
            .into_iter()
            .map(|s| s.id.clone())
            .collect();

        let mut mounts = self.mounts.lock();
        mounts.retain(|id, _| {
            let keep = visible.contains(id);
            if !keep {
                tracing::debug!("Unmounting hidden status {}", id);
            }
            keep
        });
        for id in &visible {
            if !mounts.contains_key(id) {
                let registration = self.register(id);
                mounts.insert(id.clone(), registration);
            }
        }
        visible
    }

    pub fn unmount(&self, status_id: &str) -> bool {
        self.mounts.lock().remove(status_id).is_some()
    }

    pub fn partition(&self, status_id: &str) -> Option<Partition> {
        self.mounts
            .lock()
            .get(status_id)
            .map(|r| r.partition().clone())
    }

    /// Mounted partitions in board order.
    pub fn mounted(&self) -> Vec<Partition> {
        let mounts = self.mounts.lock();
        self.board
            .ordered_statuses()
            .into_iter()
            .filter_map(|s| mounts.get(&s.id).map(|r| r.partition().clone()))
            .collect()
    }

    pub fn column(&self, status_id: &str) -> Option<PartitionView> {
        self.partition(status_id).map(|p| p.view())
    }

    /// Views of every mounted column in board order.
    pub fn columns(&self) -> Vec<PartitionView> {
        self.mounted().iter().map(Partition::view).collect()
    }

    /// Load page one of every mounted column under the current filter.
    pub async fn load_all(&self) -> Vec<ColumnOutcome> {
        let filter = self.filter();
        self.load_with(filter).await
    }

    /// Replace the filter and reload every mounted column from page one.
    ///
    /// Setting the filter already in place does nothing and returns no
    /// outcomes.
    pub async fn set_filter(&self, filter: FilterState) -> Vec<ColumnOutcome> {
        {
            let mut current = self.filter.lock();
            if *current == filter {
                tracing::debug!("Filter unchanged, skipping reload");
                return Vec::new();
            }
            *current = filter.clone();
        }

        self.mount_visible();
        let partitions = self.mounted();
        tracing::info!("Filter changed, reloading {} columns", partitions.len());
        for partition in &partitions {
            partition.reset();
        }
        self.load_with(filter).await
    }

    pub async fn load_more(&self, status_id: &str) -> BoardResult<Option<TaskPage>> {
        let partition = self.require_partition(status_id)?;
        let result = partition.load_more().await;
        if let Err(e) = &result {
            self.report_fetch(status_id, e);
        }
        result
    }

    /// Reset and reload every mounted column under the board's filter.
    pub async fn refresh_all(&self) -> Vec<ColumnOutcome> {
        tracing::info!("Refreshing all columns");
        let filter = self.filter();
        self.fan_out(move |partition| {
            let filter = filter.clone();
            async move {
                partition.reset();
                partition.load(filter, 1).await
            }
        })
        .await
    }

    /// Move a task dropped from one column onto another.
    ///
    /// The snapshot is taken from the source column's cache, so the task must
    /// be loaded there. A task whose earlier move is still open has already
    /// left that cache, so it is refused as a concurrent move.
    pub async fn on_drop_accepted(
        &self,
        task_id: &str,
        from_status_id: &str,
        to_status_id: &str,
    ) -> BoardResult<Task> {
        if self.coordinator.is_open(task_id) {
            return Err(BoardError::ConcurrentMove {
                task_id: task_id.to_string(),
            });
        }
        let snapshot = self
            .partition(from_status_id)
            .and_then(|p| p.find(task_id))
            .ok_or_else(|| {
                BoardError::NotFound(format!("task {} in status {}", task_id, from_status_id))
            })?;

        let result = self
            .coordinator
            .move_task(task_id, from_status_id, to_status_id, snapshot)
            .await;
        match &result {
            Ok(_) => self.publish(BoardNotice::MoveCommitted {
                task_id: task_id.to_string(),
                to_status_id: to_status_id.to_string(),
            }),
            Err(BoardError::MoveRejected { message, .. }) => {
                self.publish(BoardNotice::MoveRejected {
                    task_id: task_id.to_string(),
                    from_status_id: from_status_id.to_string(),
                    to_status_id: to_status_id.to_string(),
                    message: message.clone(),
                })
            }
            Err(e) => tracing::debug!("Drop of task {} not applied: {}", task_id, e),
        }
        result
    }

    /// Dispatch one view event. Column failures have already been published
    /// as notices and are not returned; errors the caller must act on are.
    pub async fn handle(&self, event: BoardEvent) -> BoardResult<()> {
        match event {
            BoardEvent::FilterChanged(filter) => {
                self.set_filter(filter).await;
                Ok(())
            }
            BoardEvent::LoadMore { status_id } => match self.load_more(&status_id).await {
                Ok(_) => Ok(()),
                Err(BoardError::Fetch { .. }) | Err(BoardError::StaleFetchDiscarded { .. }) => {
                    Ok(())
                }
                Err(e) => Err(e),
            },
            BoardEvent::DropAccepted {
                task_id,
                from_status_id,
                to_status_id,
            } => match self
                .on_drop_accepted(&task_id, &from_status_id, &to_status_id)
                .await
            {
                Ok(_) | Err(BoardError::MoveRejected { .. }) => Ok(()),
                Err(e) => Err(e),
            },
            BoardEvent::RefreshAll => {
                self.refresh_all().await;
                Ok(())
            }
        }
    }

    fn register(&self, status_id: &str) -> PartitionRegistration {
        let partition = Partition::with_filter(
            status_id,
            self.fetcher.clone(),
            self.page_size,
            self.filter(),
        );
        self.coordinator.register_partition(partition)
    }

    fn require_partition(&self, status_id: &str) -> BoardResult<Partition> {
        self.partition(status_id)
            .ok_or_else(|| BoardError::NotFound(format!("mounted status {}", status_id)))
    }

    async fn load_with(&self, filter: FilterState) -> Vec<ColumnOutcome> {
        self.fan_out(move |partition| {
            let filter = filter.clone();
            async move { partition.load(filter, 1).await }
        })
        .await
    }

    async fn fan_out<F, Fut>(&self, op: F) -> Vec<ColumnOutcome>
    where
        F: Fn(Partition) -> Fut,
        Fut: Future<Output = BoardResult<TaskPage>>,
    {
        let partitions = self.mounted();
        let results = join_all(partitions.iter().cloned().map(op)).await;
        partitions
            .into_iter()
            .zip(results)
            .map(|(partition, result)| {
                let status_id = partition.status_id().to_string();
                if let Err(e) = &result {
                    self.report_fetch(&status_id, e);
                }
                (status_id, result)
            })
            .collect()
    }

    fn report_fetch(&self, status_id: &str, error: &BoardError) {
        if error.is_user_visible() {
            self.publish(BoardNotice::FetchFailed {
                status_id: status_id.to_string(),
                message: error.to_string(),
            });
        }
    }

    fn publish(&self, notice: BoardNotice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }
}

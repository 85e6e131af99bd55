//! Optimistic moves between registered column caches.
//!
//! A move is applied locally first: the task is inserted into the target
//! column and only then removed from the source column, so at no point is it
//! missing from the board. The remote update runs afterwards and a failure
//! rolls the local state back.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use taskboard_core::{BoardError, BoardResult};
use taskboard_domain::{StatusId, Task, TaskId, TaskUpdate};

use crate::partition::Partition;
use crate::source::TaskSource;

#[derive(Default)]
struct Registry {
    partitions: HashMap<StatusId, Partition>,
    open_moves: HashSet<TaskId>,
    refresh_epoch: u64,
}

/// Keeps a partition registered with its coordinator until dropped.
///
/// Dropping a registration that has since been replaced by a newer one for
/// the same status leaves the newer one in place.
pub struct PartitionRegistration {
    registry: Weak<Mutex<Registry>>,
    partition: Partition,
}

impl PartitionRegistration {
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn status_id(&self) -> &str {
        self.partition.status_id()
    }
}

impl fmt::Debug for PartitionRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionRegistration")
            .field("status_id", &self.status_id())
            .finish()
    }
}

impl Drop for PartitionRegistration {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock();
        let status_id = self.partition.status_id();
        if matches!(registry.partitions.get(status_id), Some(p) if p.ptr_eq(&self.partition)) {
            registry.partitions.remove(status_id);
            tracing::debug!("Unregistered partition for status {}", status_id);
        }
    }
}

/// An optimistic move that has been applied locally but not resolved.
///
/// While it exists the task cannot be moved again. Dropping it closes the
/// move without touching any column.
pub struct MoveTransaction {
    task_id: TaskId,
    from_status_id: StatusId,
    to_status_id: StatusId,
    snapshot: Task,
    registry: Weak<Mutex<Registry>>,
}

impl MoveTransaction {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn from_status_id(&self) -> &str {
        &self.from_status_id
    }

    pub fn to_status_id(&self) -> &str {
        &self.to_status_id
    }

    /// The task as it was before the move.
    pub fn snapshot(&self) -> &Task {
        &self.snapshot
    }
}

impl fmt::Debug for MoveTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveTransaction")
            .field("task_id", &self.task_id)
            .field("from_status_id", &self.from_status_id)
            .field("to_status_id", &self.to_status_id)
            .finish()
    }
}

impl Drop for MoveTransaction {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().open_moves.remove(&self.task_id);
        }
    }
}

/// Registry of column caches and the moves currently in progress.
#[derive(Clone)]
pub struct MoveCoordinator {
    source: Arc<dyn TaskSource>,
    registry: Arc<Mutex<Registry>>,
}

impl MoveCoordinator {
    pub fn new(source: Arc<dyn TaskSource>) -> Self {
        Self {
            source,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Register `partition` under its status, replacing any earlier one.
    pub fn register_partition(&self, partition: Partition) -> PartitionRegistration {
        let status_id = partition.status_id().to_string();
        let replaced = self
            .registry
            .lock()
            .partitions
            .insert(status_id.clone(), partition.clone());
        if replaced.is_some() {
            tracing::debug!("Replaced partition for status {}", status_id);
        } else {
            tracing::debug!("Registered partition for status {}", status_id);
        }
        PartitionRegistration {
            registry: Arc::downgrade(&self.registry),
            partition,
        }
    }

    pub fn unregister_partition(&self, status_id: &str) -> Option<Partition> {
        self.registry.lock().partitions.remove(status_id)
    }

    pub fn partition(&self, status_id: &str) -> Option<Partition> {
        self.registry.lock().partitions.get(status_id).cloned()
    }

    /// Registered partitions ordered by status id.
    pub fn partitions(&self) -> Vec<Partition> {
        let registry = self.registry.lock();
        let mut partitions: Vec<Partition> = registry.partitions.values().cloned().collect();
        partitions.sort_by(|a, b| a.status_id().cmp(b.status_id()));
        partitions
    }

    /// Bumped after every committed move.
    pub fn refresh_epoch(&self) -> u64 {
        self.registry.lock().refresh_epoch
    }

    pub fn is_open(&self, task_id: &str) -> bool {
        self.registry.lock().open_moves.contains(task_id)
    }

    /// Apply a move locally and open a transaction for it.
    ///
    /// The task is inserted into `to` before it is removed from `from`. A
    /// side with no registered partition is skipped.
    pub fn begin_move(
        &self,
        task_id: &str,
        from_status_id: &str,
        to_status_id: &str,
        snapshot: Task,
    ) -> BoardResult<MoveTransaction> {
        if from_status_id == to_status_id {
            return Err(BoardError::Validation(format!(
                "task {} is already in status {}",
                task_id, to_status_id
            )));
        }
        if snapshot.id != task_id {
            return Err(BoardError::Validation(format!(
                "snapshot {} does not match task {}",
                snapshot.id, task_id
            )));
        }

        let (from, to) = {
            let mut registry = self.registry.lock();
            if !registry.open_moves.insert(task_id.to_string()) {
                return Err(BoardError::ConcurrentMove {
                    task_id: task_id.to_string(),
                });
            }
            (
                registry.partitions.get(from_status_id).cloned(),
                registry.partitions.get(to_status_id).cloned(),
            )
        };

        let txn = MoveTransaction {
            task_id: task_id.to_string(),
            from_status_id: from_status_id.to_string(),
            to_status_id: to_status_id.to_string(),
            snapshot,
            registry: Arc::downgrade(&self.registry),
        };

        match &to {
            Some(to) => {
                to.apply_optimistic_insert(txn.snapshot.with_status(to_status_id));
            }
            None => tracing::debug!("Status {} not mounted, skipping insert", to_status_id),
        }
        match &from {
            Some(from) => {
                from.apply_optimistic_removal(task_id);
            }
            None => tracing::debug!("Status {} not mounted, skipping removal", from_status_id),
        }

        tracing::info!(
            "Moving task {} from {} to {}",
            task_id,
            from_status_id,
            to_status_id
        );
        Ok(txn)
    }

    /// Send the status change for an open move to the task source.
    pub async fn submit(&self, txn: &MoveTransaction) -> BoardResult<Task> {
        let update = TaskUpdate::move_to(txn.to_status_id.clone());
        self.source
            .update_task(&txn.task_id, &update)
            .await
            .map_err(|e| match e {
                BoardError::MoveRejected { .. } => e,
                other => BoardError::MoveRejected {
                    task_id: txn.task_id.clone(),
                    message: other.to_string(),
                },
            })
    }

    /// Close a move with the outcome of its remote update.
    ///
    /// On failure the task is removed from the target column and the source
    /// column is reloaded from the server. The move stays open until that
    /// reload has finished.
    pub async fn resolve_move(
        &self,
        txn: MoveTransaction,
        outcome: BoardResult<Task>,
    ) -> BoardResult<Task> {
        match outcome {
            Ok(task) => {
                self.registry.lock().refresh_epoch += 1;
                tracing::info!("Task {} moved to {}", txn.task_id, txn.to_status_id);
                drop(txn);
                Ok(task)
            }
            Err(e) => {
                let message = match e {
                    BoardError::MoveRejected { message, .. } => message,
                    other => other.to_string(),
                };
                tracing::warn!(
                    "Move of task {} to {} rejected: {}",
                    txn.task_id,
                    txn.to_status_id,
                    message
                );

                if let Some(to) = self.partition(&txn.to_status_id) {
                    to.apply_optimistic_removal(&txn.task_id);
                }
                if let Some(from) = self.partition(&txn.from_status_id) {
                    if let Err(reload) = from.invalidate_and_reload().await {
                        tracing::warn!(
                            "Reload of status {} after rejected move failed: {}",
                            txn.from_status_id,
                            reload
                        );
                    }
                }

                let task_id = txn.task_id.clone();
                drop(txn);
                Err(BoardError::MoveRejected { task_id, message })
            }
        }
    }

    /// Begin, submit and resolve a move in one call.
    pub async fn move_task(
        &self,
        task_id: &str,
        from_status_id: &str,
        to_status_id: &str,
        snapshot: Task,
    ) -> BoardResult<Task> {
        let txn = self.begin_move(task_id, from_status_id, to_status_id, snapshot)?;
        let outcome = self.submit(&txn).await;
        self.resolve_move(txn, outcome).await
    }
}

impl fmt::Debug for MoveCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        let mut statuses: Vec<&StatusId> = registry.partitions.keys().collect();
        statuses.sort();
        f.debug_struct("MoveCoordinator")
            .field("partitions", &statuses)
            .field("open_moves", &registry.open_moves.len())
            .field("refresh_epoch", &registry.refresh_epoch)
            .finish()
    }
}

//! Coordination engine for a paginated, filterable task board.
//!
//! Each status column is cached by a [`Partition`]. A [`MoveCoordinator`]
//! applies optimistic moves between partitions and rolls them back when the
//! remote update fails. A [`BoardController`] owns the shared
//! [`FilterState`](taskboard_domain::FilterState) and fans filter changes and
//! refreshes out to every mounted partition.

pub mod controller;
pub mod coordinator;
pub mod events;
pub mod fetcher;
pub mod partition;
pub mod source;

#[cfg(test)]
mod testing;

pub use controller::{BoardController, ColumnOutcome};
pub use coordinator::{MoveCoordinator, MoveTransaction, PartitionRegistration};
pub use events::{BoardEvent, BoardNotice};
pub use fetcher::{PaginationFetcher, TaskQuery};
pub use partition::{Partition, PartitionView};
pub use source::{TaskPage, TaskSource};

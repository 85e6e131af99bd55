//! Task filtering.
//!
//! `FilterState` is the facet selection a board applies to every column.
//! `TaskFilter` implementations evaluate it against individual tasks.

pub mod filter_state;
pub mod task_filter;

pub use filter_state::{DateRange, FilterState};
pub use task_filter::{CompositeFilter, StatusFilter, TaskFilter};

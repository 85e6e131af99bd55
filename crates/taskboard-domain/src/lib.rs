pub mod board;
pub mod field_update;
pub mod filter;
pub mod status;
pub mod task;
pub mod task_update;

pub use board::{Board, BoardId};
pub use field_update::FieldUpdate;
pub use filter::{CompositeFilter, DateRange, FilterState, StatusFilter, TaskFilter};
pub use status::{StatusColumn, StatusId};
pub use task::{EntityId, Task, TaskId};
pub use task_update::TaskUpdate;

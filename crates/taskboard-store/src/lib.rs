//! Storage backends for the taskboard sync engine: an in-memory
//! [`TaskSource`](taskboard_sync::TaskSource) and the JSON board file the
//! CLI reads and writes.

pub mod memory_store;
pub mod store;

pub use memory_store::MemoryTaskStore;
pub use store::{AtomicWriter, BoardFile, JsonTaskFile, BOARD_FILE_VERSION};

pub mod atomic_writer;
pub mod json_task_file;

pub use atomic_writer::AtomicWriter;
pub use json_task_file::{BoardFile, JsonTaskFile, BOARD_FILE_VERSION};

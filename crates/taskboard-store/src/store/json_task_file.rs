use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskboard_core::{BoardError, BoardResult};
use taskboard_domain::{Board, Task};

use crate::memory_store::MemoryTaskStore;
use crate::store::atomic_writer::AtomicWriter;

pub const BOARD_FILE_VERSION: u32 = 1;

fn default_version() -> u32 {
    BOARD_FILE_VERSION
}

/// Contents of a board file: one board and every task on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardFile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub board: Board,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl BoardFile {
    pub fn new(board: Board, tasks: Vec<Task>) -> Self {
        Self {
            version: BOARD_FILE_VERSION,
            board,
            tasks,
        }
    }

    /// Tasks whose status is not a column of the board.
    pub fn orphaned_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.board.status(&t.status_id).is_none())
            .collect()
    }

    pub fn into_store(self) -> (Board, MemoryTaskStore) {
        (self.board, MemoryTaskStore::new(self.tasks))
    }
}

/// A board file on disk.
#[derive(Debug, Clone)]
pub struct JsonTaskFile {
    path: PathBuf,
}

impl JsonTaskFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub async fn load(&self) -> BoardResult<BoardFile> {
        let bytes = AtomicWriter::read_all(&self.path).await?;
        let file: BoardFile = serde_json::from_slice(&bytes)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;
        if file.version != BOARD_FILE_VERSION {
            return Err(BoardError::Serialization(format!(
                "Unsupported board file version: {}",
                file.version
            )));
        }

        let orphaned = file.orphaned_tasks().len();
        if orphaned > 0 {
            tracing::warn!(
                "{} tasks in {} belong to no column of board {}",
                orphaned,
                self.path.display(),
                file.board.id
            );
        }
        tracing::info!(
            "Loaded board {} with {} tasks from {}",
            file.board.id,
            file.tasks.len(),
            self.path.display()
        );
        Ok(file)
    }

    pub async fn save(&self, file: &BoardFile) -> BoardResult<()> {
        let json = serde_json::to_vec_pretty(file)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;
        AtomicWriter::write_atomic(&self.path, &json).await?;
        tracing::info!(
            "Saved board {} with {} tasks to {}",
            file.board.id,
            file.tasks.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn board_file() -> BoardFile {
        let board = Board::new("b1", "Delivery")
            .with_status("todo", "Todo")
            .with_status("done", "Done");
        BoardFile::new(
            board,
            vec![
                Task::new("t1", "todo", "Write docs"),
                Task::new("t2", "done", "Ship"),
            ],
        )
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file = JsonTaskFile::new(dir.path().join("board.json"));
        assert!(!file.exists());

        let contents = board_file();
        file.save(&contents).await.unwrap();
        assert!(file.exists());

        let loaded = file.load().await.unwrap();
        assert_eq!(loaded, contents);
    }

    #[tokio::test]
    async fn test_version_defaults_and_is_checked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        let raw = json!({
            "board": { "id": "b1", "name": "Delivery" },
            "tasks": []
        });
        std::fs::write(&path, raw.to_string()).unwrap();
        let loaded = JsonTaskFile::new(&path).load().await.unwrap();
        assert_eq!(loaded.version, BOARD_FILE_VERSION);

        let raw = json!({ "version": 9, "board": { "id": "b1", "name": "Delivery" } });
        std::fs::write(&path, raw.to_string()).unwrap();
        let err = JsonTaskFile::new(&path).load().await.unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_malformed_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonTaskFile::new(&path).load().await.unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }

    #[test]
    fn test_orphaned_tasks() {
        let mut contents = board_file();
        contents.tasks.push(Task::new("t3", "archived", "Old"));
        let orphaned: Vec<&str> = contents
            .orphaned_tasks()
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(orphaned, vec!["t3"]);
    }
}

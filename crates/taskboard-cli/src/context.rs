use std::path::Path;
use std::sync::Arc;
use taskboard_core::{AppConfig, BoardError, BoardResult};
use taskboard_domain::{Board, Task};
use taskboard_store::{BoardFile, JsonTaskFile, MemoryTaskStore};
use taskboard_sync::BoardController;

/// A board file opened for one command.
pub struct CliContext {
    file: JsonTaskFile,
    board: Board,
    store: Arc<MemoryTaskStore>,
    controller: BoardController,
}

impl CliContext {
    pub async fn load(path: &Path, config: &AppConfig) -> BoardResult<Self> {
        let file = JsonTaskFile::new(path);
        if !file.exists() {
            return Err(BoardError::NotFound(format!(
                "board file {}",
                path.display()
            )));
        }

        let contents = file.load().await?;
        if let Some(expected) = &config.board_id {
            if *expected != contents.board.id {
                return Err(BoardError::Validation(format!(
                    "{} holds board {}, expected {}",
                    path.display(),
                    contents.board.id,
                    expected
                )));
            }
        }

        let (board, store) = contents.into_store();
        let store = Arc::new(store);
        let controller = BoardController::new(board.clone(), store.clone(), config);
        Ok(Self {
            file,
            board,
            store,
            controller,
        })
    }

    pub fn controller(&self) -> &BoardController {
        &self.controller
    }

    /// Current server-side copy of a task.
    pub fn stored_task(&self, task_id: &str) -> BoardResult<Task> {
        self.store
            .task(task_id)
            .ok_or_else(|| BoardError::NotFound(format!("task {}", task_id)))
    }

    /// Write the store's tasks back to the board file.
    pub async fn save(&self) -> BoardResult<()> {
        let contents = BoardFile::new(self.board.clone(), self.store.tasks());
        self.file.save(&contents).await
    }
}

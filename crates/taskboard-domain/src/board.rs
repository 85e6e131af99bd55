use serde::{Deserialize, Serialize};
use taskboard_core::{BoardError, BoardResult};

use crate::filter::FilterState;
use crate::status::{StatusColumn, StatusId};

pub type BoardId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub statuses: Vec<StatusColumn>,
}

impl Board {
    pub fn new(id: impl Into<BoardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            statuses: Vec::new(),
        }
    }

    /// Append a status column after the existing ones.
    pub fn with_status(mut self, id: impl Into<StatusId>, name: impl Into<String>) -> Self {
        let position = self
            .statuses
            .iter()
            .map(|s| s.position + 1)
            .max()
            .unwrap_or(0);
        self.statuses.push(StatusColumn::new(id, name, position));
        self
    }

    pub fn status(&self, id: &str) -> Option<&StatusColumn> {
        self.statuses.iter().find(|s| s.id == id)
    }

    /// Like [`Board::status`], failing with `NotFound` for unknown ids.
    pub fn require_status(&self, id: &str) -> BoardResult<&StatusColumn> {
        self.status(id).ok_or_else(|| {
            BoardError::NotFound(format!("status {} on board {}", id, self.id))
        })
    }

    pub fn status_mut(&mut self, id: &str) -> Option<&mut StatusColumn> {
        self.statuses.iter_mut().find(|s| s.id == id)
    }

    /// Status columns in display order.
    pub fn ordered_statuses(&self) -> Vec<&StatusColumn> {
        let mut statuses: Vec<&StatusColumn> = self.statuses.iter().collect();
        statuses.sort_by_key(|s| s.position);
        statuses
    }

    /// Columns that should be mounted under `filter`: not collapsed, and not
    /// excluded by the status facet.
    pub fn visible_statuses(&self, filter: &FilterState) -> Vec<&StatusColumn> {
        self.ordered_statuses()
            .into_iter()
            .filter(|s| !s.collapsed)
            .filter(|s| filter.status_ids.is_empty() || filter.status_ids.contains(&s.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new("b1", "Delivery")
            .with_status("todo", "Todo")
            .with_status("doing", "In Progress")
            .with_status("blocked", "Blocked")
            .with_status("done", "Done")
    }

    #[test]
    fn test_positions_are_sequential() {
        let board = board();
        let positions: Vec<i32> = board.statuses.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_ordered_statuses_follow_position() {
        let mut board = board();
        board.status_mut("done").unwrap().update_position(-1);
        let ids: Vec<&str> = board
            .ordered_statuses()
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["done", "todo", "doing", "blocked"]);
    }

    #[test]
    fn test_visible_statuses_skip_collapsed_and_filtered() {
        let mut board = board();
        board.status_mut("blocked").unwrap().set_collapsed(true);

        let all = board.visible_statuses(&FilterState::default());
        assert_eq!(all.len(), 3);

        let filter = FilterState::new().with_status_ids(["todo", "blocked"]);
        let ids: Vec<&str> = board
            .visible_statuses(&filter)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["todo"]);
    }

    #[test]
    fn test_require_status() {
        let board = board();
        assert_eq!(board.require_status("done").unwrap().name, "Done");
        assert!(matches!(
            board.require_status("archived"),
            Err(BoardError::NotFound(_))
        ));
    }
}

use serde::{Deserialize, Serialize};

pub type StatusId = String;

/// One status column of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusColumn {
    pub id: StatusId,
    pub name: String,
    pub position: i32,
    /// Collapsed columns are not mounted and hold no cache.
    #[serde(default)]
    pub collapsed: bool,
}

impl StatusColumn {
    pub fn new(id: impl Into<StatusId>, name: impl Into<String>, position: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            collapsed: false,
        }
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub fn update_position(&mut self, position: i32) {
        self.position = position;
    }
}

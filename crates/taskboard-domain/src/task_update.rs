use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::field_update::FieldUpdate;
use crate::status::StatusId;
use crate::task::{EntityId, Task};

/// Partial update sent to the single-task update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(rename = "taskStatusId", skip_serializing_if = "Option::is_none")]
    pub status_id: Option<StatusId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_no_change")]
    pub description: FieldUpdate<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_no_change")]
    pub priority_id: FieldUpdate<EntityId>,
    #[serde(skip_serializing_if = "FieldUpdate::is_no_change")]
    pub initiative_id: FieldUpdate<EntityId>,
    #[serde(skip_serializing_if = "FieldUpdate::is_no_change")]
    pub assignee_id: FieldUpdate<EntityId>,
    #[serde(skip_serializing_if = "FieldUpdate::is_no_change")]
    pub reviewer_id: FieldUpdate<EntityId>,
    #[serde(skip_serializing_if = "FieldUpdate::is_no_change")]
    pub ba_id: FieldUpdate<EntityId>,
    #[serde(skip_serializing_if = "FieldUpdate::is_no_change")]
    pub due_date: FieldUpdate<DateTime<Utc>>,
}

impl TaskUpdate {
    /// The update a drag between status columns sends.
    pub fn move_to(status_id: impl Into<StatusId>) -> Self {
        Self {
            status_id: Some(status_id.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status_id.is_none()
            && self.title.is_none()
            && self.description.is_no_change()
            && self.priority_id.is_no_change()
            && self.initiative_id.is_no_change()
            && self.assignee_id.is_no_change()
            && self.reviewer_id.is_no_change()
            && self.ba_id.is_no_change()
            && self.due_date.is_no_change()
    }

    /// New task value with this update applied.
    pub fn applied_to(&self, task: &Task) -> Task {
        let mut updated = task.clone();
        if let Some(status_id) = &self.status_id {
            updated.status_id = status_id.clone();
        }
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        self.description.apply_cloned(&mut updated.description);
        self.priority_id.apply_cloned(&mut updated.priority_id);
        self.initiative_id.apply_cloned(&mut updated.initiative_id);
        self.assignee_id.apply_cloned(&mut updated.assignee_id);
        self.reviewer_id.apply_cloned(&mut updated.reviewer_id);
        self.ba_id.apply_cloned(&mut updated.ba_id);
        self.due_date.apply_cloned(&mut updated.due_date);
        updated
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::status::StatusId;

pub type TaskId = String;
pub type EntityId = String;

/// Cached copy of a remote task.
///
/// Copies are value snapshots: changing one produces a new `Task` rather
/// than editing a shared instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "taskStatusId")]
    pub status_id: StatusId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ba_id: Option<EntityId>,
    #[serde(default)]
    pub member_ids: BTreeSet<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Fields this engine does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        status_id: impl Into<StatusId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status_id: status_id.into(),
            title: title.into(),
            description: None,
            priority_id: None,
            initiative_id: None,
            assignee_id: None,
            reviewer_id: None,
            ba_id: None,
            member_ids: BTreeSet::new(),
            due_date: None,
            created_at: Utc::now(),
            extra: serde_json::Map::new(),
        }
    }

    /// Copy of this task placed in another status column.
    pub fn with_status(&self, status_id: &str) -> Self {
        Self {
            status_id: status_id.to_string(),
            ..self.clone()
        }
    }

    pub fn with_priority(mut self, priority_id: impl Into<EntityId>) -> Self {
        self.priority_id = Some(priority_id.into());
        self
    }

    pub fn with_initiative(mut self, initiative_id: impl Into<EntityId>) -> Self {
        self.initiative_id = Some(initiative_id.into());
        self
    }

    pub fn with_assignee(mut self, assignee_id: impl Into<EntityId>) -> Self {
        self.assignee_id = Some(assignee_id.into());
        self
    }

    pub fn with_reviewer(mut self, reviewer_id: impl Into<EntityId>) -> Self {
        self.reviewer_id = Some(reviewer_id.into());
        self
    }

    pub fn with_ba(mut self, ba_id: impl Into<EntityId>) -> Self {
        self.ba_id = Some(ba_id.into());
        self
    }

    pub fn with_members<I, S>(mut self, member_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.member_ids = member_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

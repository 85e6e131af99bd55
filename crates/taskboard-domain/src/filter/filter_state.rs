//! Board filter configuration.
//!
//! Provides the FilterState value shared by every column of a board.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::task::EntityId;

/// Inclusive date bounds; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Facets applied to every column of a board.
///
/// Replaced wholesale on each edit; two states are the same filter exactly
/// when they compare equal. Empty sets do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub status_ids: BTreeSet<EntityId>,
    pub priority_ids: BTreeSet<EntityId>,
    pub initiative_ids: BTreeSet<EntityId>,
    pub assignee_ids: BTreeSet<EntityId>,
    pub reviewer_ids: BTreeSet<EntityId>,
    pub ba_ids: BTreeSet<EntityId>,
    pub member_ids: BTreeSet<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date_range: Option<DateRange>,
}

fn id_set<I, S>(ids: I) -> BTreeSet<EntityId>
where
    I: IntoIterator<Item = S>,
    S: Into<EntityId>,
{
    ids.into_iter().map(Into::into).collect()
}

impl FilterState {
    /// Create a filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.status_ids = id_set(ids);
        self
    }

    pub fn with_priority_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.priority_ids = id_set(ids);
        self
    }

    pub fn with_initiative_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.initiative_ids = id_set(ids);
        self
    }

    pub fn with_assignee_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.assignee_ids = id_set(ids);
        self
    }

    pub fn with_reviewer_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.reviewer_ids = id_set(ids);
        self
    }

    pub fn with_ba_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.ba_ids = id_set(ids);
        self
    }

    pub fn with_member_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.member_ids = id_set(ids);
        self
    }

    pub fn with_due_date_range(mut self, range: DateRange) -> Self {
        self.due_date_range = (!range.is_unbounded()).then_some(range);
        self
    }

    pub fn with_created_date_range(mut self, range: DateRange) -> Self {
        self.created_date_range = (!range.is_unbounded()).then_some(range);
        self
    }

    /// Check if any facet is active.
    pub fn has_active_filters(&self) -> bool {
        !self.status_ids.is_empty()
            || !self.priority_ids.is_empty()
            || !self.initiative_ids.is_empty()
            || !self.assignee_ids.is_empty()
            || !self.reviewer_ids.is_empty()
            || !self.ba_ids.is_empty()
            || !self.member_ids.is_empty()
            || self.due_date_range.is_some()
            || self.created_date_range.is_some()
    }
}

//! Task filtering implementations.
//!
//! Provides the TaskFilter trait, the facet evaluation for FilterState and
//! the per-column StatusFilter.

use std::collections::BTreeSet;

use crate::filter::FilterState;
use crate::status::StatusId;
use crate::task::{EntityId, Task};

/// Trait for filtering tasks by various criteria.
pub trait TaskFilter {
    /// Returns true if the task matches the filter criteria.
    fn matches(&self, task: &Task) -> bool;
}

fn facet_matches(selected: &BTreeSet<EntityId>, value: Option<&EntityId>) -> bool {
    selected.is_empty() || value.is_some_and(|v| selected.contains(v))
}

impl TaskFilter for FilterState {
    fn matches(&self, task: &Task) -> bool {
        if !facet_matches(&self.status_ids, Some(&task.status_id))
            || !facet_matches(&self.priority_ids, task.priority_id.as_ref())
            || !facet_matches(&self.initiative_ids, task.initiative_id.as_ref())
            || !facet_matches(&self.assignee_ids, task.assignee_id.as_ref())
            || !facet_matches(&self.reviewer_ids, task.reviewer_id.as_ref())
            || !facet_matches(&self.ba_ids, task.ba_id.as_ref())
        {
            return false;
        }

        // Any shared member is enough.
        if !self.member_ids.is_empty() && self.member_ids.is_disjoint(&task.member_ids) {
            return false;
        }

        if let Some(range) = &self.due_date_range {
            match task.due_date {
                Some(due) if range.contains(due.date_naive()) => {}
                _ => return false,
            }
        }

        self.created_date_range
            .map_or(true, |range| range.contains(task.created_at.date_naive()))
    }
}

/// Filter tasks by status column.
pub struct StatusFilter {
    status_id: StatusId,
}

impl StatusFilter {
    pub fn new(status_id: impl Into<StatusId>) -> Self {
        Self {
            status_id: status_id.into(),
        }
    }
}

impl TaskFilter for StatusFilter {
    fn matches(&self, task: &Task) -> bool {
        task.status_id == self.status_id
    }
}

/// Combine multiple filters with AND logic.
///
/// A task matches only if it passes all filters.
pub struct CompositeFilter<'a> {
    filters: Vec<Box<dyn TaskFilter + 'a>>,
}

impl<'a> CompositeFilter<'a> {
    /// Create an empty composite filter (matches all tasks).
    pub fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Add a filter to the composite (builder pattern).
    pub fn with_filter(mut self, filter: impl TaskFilter + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for CompositeFilter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskFilter for CompositeFilter<'_> {
    fn matches(&self, task: &Task) -> bool {
        self.filters.iter().all(|f| f.matches(task))
    }
}

impl<T: TaskFilter + ?Sized> TaskFilter for &T {
    fn matches(&self, task: &Task) -> bool {
        (**self).matches(task)
    }
}

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use taskboard_core::{BoardError, BoardResult};
use taskboard_domain::{BoardId, DateRange, EntityId, FilterState, StatusId};

use crate::source::{TaskPage, TaskSource};

/// Everything the list endpoint needs to produce one column page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub board_id: BoardId,
    pub status_id: StatusId,
    pub filter: FilterState,
    pub page: u32,
    pub page_size: u32,
}

fn push_ids(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    ids: &BTreeSet<EntityId>,
) {
    if !ids.is_empty() {
        let joined = ids.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        pairs.push((key, joined));
    }
}

fn push_range(
    pairs: &mut Vec<(&'static str, String)>,
    keys: (&'static str, &'static str),
    range: Option<&DateRange>,
) {
    let Some(range) = range else { return };
    if let Some(from) = range.from {
        pairs.push((keys.0, from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = range.to {
        pairs.push((keys.1, to.format("%Y-%m-%d").to_string()));
    }
}

impl TaskQuery {
    /// Query-string parameters in a stable order. Id facets are comma-joined,
    /// dates are ISO-8601, empty facets are left out.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("boardId", self.board_id.clone()),
            ("taskStatusId", self.status_id.clone()),
            ("page", self.page.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        let filter = &self.filter;
        push_ids(&mut pairs, "statusIds", &filter.status_ids);
        push_ids(&mut pairs, "priorityIds", &filter.priority_ids);
        push_ids(&mut pairs, "initiativeIds", &filter.initiative_ids);
        push_ids(&mut pairs, "assigneeIds", &filter.assignee_ids);
        push_ids(&mut pairs, "reviewerIds", &filter.reviewer_ids);
        push_ids(&mut pairs, "baIds", &filter.ba_ids);
        push_ids(&mut pairs, "memberIds", &filter.member_ids);
        push_range(
            &mut pairs,
            ("dueDateFrom", "dueDateTo"),
            filter.due_date_range.as_ref(),
        );
        push_range(
            &mut pairs,
            ("createdFrom", "createdTo"),
            filter.created_date_range.as_ref(),
        );
        pairs
    }
}

/// Turns column coordinates into list queries against a [`TaskSource`].
///
/// Holds no per-column state, so one fetcher is shared by every partition of
/// a board.
#[derive(Clone)]
pub struct PaginationFetcher {
    source: Arc<dyn TaskSource>,
    board_id: BoardId,
}

impl PaginationFetcher {
    pub fn new(source: Arc<dyn TaskSource>, board_id: impl Into<BoardId>) -> Self {
        Self {
            source,
            board_id: board_id.into(),
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn source(&self) -> &Arc<dyn TaskSource> {
        &self.source
    }

    pub fn query(
        &self,
        status_id: &str,
        filter: &FilterState,
        page: u32,
        page_size: u32,
    ) -> TaskQuery {
        TaskQuery {
            board_id: self.board_id.clone(),
            status_id: status_id.to_string(),
            filter: filter.clone(),
            page: page.max(1),
            page_size,
        }
    }

    /// Fetch one page. Any failure is reported as [`BoardError::Fetch`].
    pub async fn fetch(
        &self,
        status_id: &str,
        filter: &FilterState,
        page: u32,
        page_size: u32,
    ) -> BoardResult<TaskPage> {
        let query = self.query(status_id, filter, page, page_size);
        tracing::debug!(
            "Fetching page {} of status {} ({} per page)",
            query.page,
            status_id,
            page_size
        );

        self.source.list_tasks(&query).await.map_err(|e| match e {
            BoardError::Fetch { .. } => e,
            other => BoardError::Fetch {
                status_id: status_id.to_string(),
                message: other.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockTaskSource;
    use crate::testing::task;
    use chrono::NaiveDate;
    use taskboard_core::PaginationMeta;

    #[test]
    fn test_query_pairs_without_filters() {
        let fetcher = PaginationFetcher::new(Arc::new(MockTaskSource::new()), "b1");
        let pairs = fetcher
            .query("todo", &FilterState::default(), 2, 10)
            .to_query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("boardId", "b1".to_string()),
                ("taskStatusId", "todo".to_string()),
                ("page", "2".to_string()),
                ("limit", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_join_ids_and_dates() {
        let filter = FilterState::new()
            .with_priority_ids(["p2", "p1"])
            .with_member_ids(["m1"])
            .with_due_date_range(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1),
                NaiveDate::from_ymd_opt(2024, 1, 31),
            ))
            .with_created_date_range(DateRange::new(
                None,
                NaiveDate::from_ymd_opt(2023, 12, 31),
            ));
        let fetcher = PaginationFetcher::new(Arc::new(MockTaskSource::new()), "b1");
        let pairs = fetcher.query("todo", &filter, 1, 20).to_query_pairs();

        assert!(pairs.contains(&("priorityIds", "p1,p2".to_string())));
        assert!(pairs.contains(&("memberIds", "m1".to_string())));
        assert!(pairs.contains(&("dueDateFrom", "2024-01-01".to_string())));
        assert!(pairs.contains(&("dueDateTo", "2024-01-31".to_string())));
        assert!(pairs.contains(&("createdTo", "2023-12-31".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "createdFrom"));
        assert!(!pairs.iter().any(|(k, _)| *k == "assigneeIds"));
    }

    #[test]
    fn test_page_zero_is_requested_as_page_one() {
        let fetcher = PaginationFetcher::new(Arc::new(MockTaskSource::new()), "b1");
        assert_eq!(fetcher.query("todo", &FilterState::default(), 0, 5).page, 1);
    }

    #[tokio::test]
    async fn test_fetch_passes_query_to_source() {
        let mut source = MockTaskSource::new();
        source
            .expect_list_tasks()
            .withf(|q: &TaskQuery| q.status_id == "done" && q.page == 3 && q.page_size == 5)
            .times(1)
            .returning(|q| {
                Ok(TaskPage {
                    items: vec![task("t11", "done")],
                    pagination: PaginationMeta::for_page(q.page, q.page_size, 11),
                })
            });

        let fetcher = PaginationFetcher::new(Arc::new(source), "b1");
        let page = fetcher
            .fetch("done", &FilterState::default(), 3, 5)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.pagination.has_next);
    }

    #[tokio::test]
    async fn test_fetch_wraps_source_errors() {
        let mut source = MockTaskSource::new();
        source
            .expect_list_tasks()
            .returning(|_| Err(BoardError::Io("connection reset".to_string())));

        let fetcher = PaginationFetcher::new(Arc::new(source), "b1");
        let err = fetcher
            .fetch("todo", &FilterState::default(), 1, 5)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BoardError::Fetch {
                status_id: "todo".to_string(),
                message: "IO error: connection reset".to_string(),
            }
        );
    }
}

//! Server-driven pagination state.
//!
//! `PaginationMeta` is what a list endpoint reports about one page.
//! `PageCursor` is what a column cache remembers between pages. Neither knows
//! anything about the items themselves.

use serde::{Deserialize, Serialize};

/// Pagination metadata returned alongside one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Page number (1-indexed).
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Total number of matching items on the server.
    pub total: u64,
    /// Total number of pages (0 if no items).
    pub total_pages: u64,
    /// Whether a page after this one exists.
    pub has_next: bool,
    /// Whether a page before this one exists.
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Compute metadata for `page` of a result set of `total` items.
    pub fn for_page(page: u32, limit: u32, total: u64) -> Self {
        let page = page.max(1);
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: u64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

/// Pagination cursor for one cached column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// Last page loaded (1-indexed).
    pub page: u32,
    /// Items requested per page.
    pub page_size: u32,
    /// Server-reported total for the current filter.
    pub total: u64,
    /// `None` until the first page has been loaded.
    pub has_more: Option<bool>,
}

impl PageCursor {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            has_more: None,
        }
    }

    /// Back to page one with nothing known about the server state.
    pub fn reset(&mut self) {
        self.page = 1;
        self.total = 0;
        self.has_more = None;
    }

    /// Take page, total and continuation from server metadata.
    pub fn apply(&mut self, meta: &PaginationMeta) {
        self.page = meta.page.max(1);
        self.total = meta.total;
        self.has_more = Some(meta.has_next);
    }

    pub fn next_page(&self) -> u32 {
        self.page + 1
    }

    pub fn has_more(&self) -> bool {
        self.has_more.unwrap_or(false)
    }

    /// Count for the "load more" label: what is left on the server, capped at
    /// one page.
    pub fn remaining_label(&self, loaded: usize) -> u64 {
        self.total
            .saturating_sub(loaded as u64)
            .min(u64::from(self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_for_first_page() {
        let meta = PaginationMeta::for_page(1, 5, 7);
        assert_eq!(meta.total_pages, 2);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
        assert_eq!(meta.offset(), 0);
    }

    #[test]
    fn test_meta_for_last_page() {
        let meta = PaginationMeta::for_page(2, 5, 7);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(meta.offset(), 5);
    }

    #[test]
    fn test_meta_empty_result() {
        let meta = PaginationMeta::for_page(1, 5, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_meta_page_zero_is_clamped() {
        let meta = PaginationMeta::for_page(0, 5, 12);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.offset(), 0);
    }

    #[test]
    fn test_meta_wire_format_is_camel_case() {
        let meta = PaginationMeta::for_page(1, 10, 25);
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrev"], false);
    }

    #[test]
    fn test_cursor_starts_unknown() {
        let cursor = PageCursor::new(5);
        assert_eq!(cursor.page, 1);
        assert_eq!(cursor.has_more, None);
        assert!(!cursor.has_more());
    }

    #[test]
    fn test_cursor_apply_and_reset() {
        let mut cursor = PageCursor::new(5);
        cursor.apply(&PaginationMeta::for_page(2, 5, 12));
        assert_eq!(cursor.page, 2);
        assert_eq!(cursor.total, 12);
        assert!(cursor.has_more());
        assert_eq!(cursor.next_page(), 3);

        cursor.reset();
        assert_eq!(cursor.page, 1);
        assert_eq!(cursor.total, 0);
        assert_eq!(cursor.has_more, None);
    }

    #[test]
    fn test_remaining_label_capped_at_page_size() {
        let mut cursor = PageCursor::new(5);
        cursor.apply(&PaginationMeta::for_page(1, 5, 30));
        assert_eq!(cursor.remaining_label(5), 5);
        assert_eq!(cursor.remaining_label(27), 3);
        // Optimistic inserts can push loaded past total.
        assert_eq!(cursor.remaining_label(31), 0);
    }
}

//! Page cursors and pagination link construction.

use crate::document::PaginationLinks;

/// Position of one page within a collection. Derived fresh per call by the
/// store; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageCursor {
    pub current_page: u32,
    pub last_page: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl PageCursor {
    /// Cursor for `total_count` items viewed at `page_size` per page.
    /// An empty collection still has a single (empty) page.
    pub fn new(current_page: u32, page_size: u32, total_count: u64) -> Self {
        let page_size = page_size.max(1);
        let last_page = ((total_count.max(1) + page_size as u64 - 1) / page_size as u64) as u32;
        PageCursor {
            current_page: current_page.max(1),
            last_page,
            page_size,
            total_count,
        }
    }

    pub fn next_page(&self) -> Option<u32> {
        if self.current_page < self.last_page {
            Some(self.current_page + 1)
        } else {
            None
        }
    }

    pub fn prev_page(&self) -> Option<u32> {
        if self.current_page > 1 {
            Some(self.current_page - 1)
        } else {
            None
        }
    }
}

/// Builds the `collection/self/first/last/prev/next` link set. `prev` and
/// `next` are null (not absent) when there is no such page.
pub fn build(base_url: &str, cursor: &PageCursor) -> PaginationLinks {
    let page_url = |page: u32| format!("{}?page={}", base_url, page);
    PaginationLinks {
        collection: base_url.to_string(),
        self_url: page_url(cursor.current_page),
        first: page_url(1),
        last: page_url(cursor.last_page),
        prev: cursor.prev_page().map(page_url),
        next: cursor.next_page().map(page_url),
    }
}

//! Pagination primitives shared by list queries.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 200;

/// Zero-based page request, parsed from `?page=&size=` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "PageQuery::default_size")]
    pub size: u32,
}

impl PageQuery {
    fn default_size() -> u32 {
        DEFAULT_PAGE_SIZE
    }

    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Effective page size: zero falls back to the default, oversized
    /// requests are capped.
    pub fn limit(&self) -> u32 {
        if self.size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.size.min(MAX_PAGE_SIZE)
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit())
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total row count across all pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, query: &PageQuery) -> Self {
        Self {
            items,
            total,
            page: query.page,
            size: query.limit(),
        }
    }

    /// Page the way an in-memory backend does: slice an already-filtered,
    /// already-ordered vector.
    pub fn slice(all: Vec<T>, query: &PageQuery) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Self::new(items, total, query)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_caps_and_defaults() {
        assert_eq!(PageQuery::new(0, 0).limit(), 20);
        assert_eq!(PageQuery::new(0, 50).limit(), 50);
        assert_eq!(PageQuery::new(0, 5000).limit(), 200);
    }

    #[test]
    fn slice_returns_requested_window() {
        let all: Vec<i32> = (0..45).collect();
        let page = Page::slice(all, &PageQuery::new(2, 20));
        assert_eq!(page.total, 45);
        assert_eq!(page.items, (40..45).collect::<Vec<_>>());
        assert_eq!(page.page, 2);
        assert_eq!(page.size, 20);
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let page = Page::slice(vec![1, 2, 3], &PageQuery::new(9, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }
}

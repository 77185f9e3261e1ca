/// Shared types used across the codebase

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// `?page=&page_size=` query parameters; pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// A resolved LIMIT/OFFSET window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn page(&self, max_page_size: u32) -> Page {
        let size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, max_page_size.max(1));
        let page = self.page.unwrap_or(1).max(1);

        Page {
            limit: i64::from(size),
            offset: i64::from(page - 1) * i64::from(size),
        }
    }
}

//! Pagination parameters and response metadata.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not ask for one.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Hard cap on page size.
pub const MAX_PER_PAGE: i64 = 100;

/// Normalized pagination parameters taken from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub per_page: i64,
}

impl PageParams {
    /// Clamp raw query values into a usable range: page starts at 1,
    /// per_page is capped at [`MAX_PER_PAGE`].
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        Self { page, per_page }
    }

    /// Row offset for a LIMIT/OFFSET query.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

/// Pagination block embedded in list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Build the metadata block for a page over `total` matching rows.
    pub fn new(params: PageParams, total: i64) -> Self {
        // Ceiling division; per_page is always >= 1 and total >= 0 here.
        let pages = if total == 0 {
            0
        } else {
            (total + params.per_page - 1) / params.per_page
        };
        Self {
            page: params.page,
            per_page: params.per_page,
            total,
            pages,
            has_next: params.page < pages,
            has_prev: params.page > 1,
        }
    }
}

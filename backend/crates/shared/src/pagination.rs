//! Pagination
//!
//! Page/limit normalization and the metadata returned with list responses.

use serde::{Deserialize, Serialize};

/// Upper bound on `limit` accepted from callers.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Normalized page request (`page` is 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build from raw caller input.
    ///
    /// A missing or non-positive `page` becomes 1, a missing or non-positive
    /// `limit` becomes `default_limit`, and `limit` is capped at
    /// [`MAX_PAGE_LIMIT`].
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: u32) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let limit = match limit {
            Some(l) if l >= 1 => (l.min(MAX_PAGE_LIMIT as i64)) as u32,
            _ => default_limit.clamp(1, MAX_PAGE_LIMIT),
        };
        Self { page, limit }
    }

    /// Parse `page`/`limit` query strings leniently; unparseable input
    /// falls back to the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u32) -> Self {
        let parse = |s: Option<&str>| s.and_then(|v| v.trim().parse::<i64>().ok());
        Self::new(parse(page), parse(limit), default_limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageMeta {
    pub fn new(total: u64, request: PageRequest) -> Self {
        let limit = request.limit() as u64;
        let total_pages = total.div_ceil(limit);
        let page = request.page();
        Self {
            total,
            page,
            limit: request.limit(),
            total_pages,
            has_next_page: (page as u64) < total_pages,
            has_previous_page: page > 1,
        }
    }
}

// src/models/mod.rs

pub mod quiz;
pub mod result;
pub mod stats;
pub mod user;

use serde::Serialize;

/// One page of a listing plus paging metadata.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self { page, limit, total, pages }
    }
}

/// Clamps raw `page` / `limit` query values.
/// Returns `(page, limit, offset)`.
pub fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit
        .unwrap_or(crate::config::DEFAULT_PAGE_SIZE)
        .clamp(1, crate::config::MAX_PAGE_SIZE);
    (page, limit, (page - 1).saturating_mul(limit))
}

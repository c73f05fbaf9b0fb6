//! Pagination query parameters and response metadata.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Pagination query parameters for `GET /all`.
///
/// Uses `serde_with` to parse numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Validates parameters and applies defaults.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `limit`: 10
    ///
    /// # Validation
    ///
    /// - Page must be >= 1
    /// - Limit must be between 1 and 100
    ///
    /// # Returns
    ///
    /// `(page, limit)`
    pub fn validate_and_get_page_limit(&self) -> Result<(u32, u32), String> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        if page == 0 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(format!("Limit must be between 1 and {}", MAX_LIMIT));
        }

        Ok((page, limit))
    }
}

/// Pagination metadata returned with list responses.
///
/// `total_pages` rounds up, so a partial last page still counts. With no
/// rows there are no pages: `total_pages = 0` and `has_next = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let total = total.max(0);
        let limit_i64 = i64::from(limit.max(1));
        let total_pages = (total + limit_i64 - 1) / limit_i64;

        Self {
            total,
            page,
            limit,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_previous: page > 1,
        }
    }
}

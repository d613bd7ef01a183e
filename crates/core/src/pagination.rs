//! Offset/limit pagination for list queries.
//!
//! Converts raw `page` / `limit` query parameters into a bounded window. Pure:
//! no IO, no state.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
/// Upper bound on a single page, whatever the client asks for.
pub const MAX_LIMIT: i64 = 1000;

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number as requested (1-based; values < 1 are kept and yield offset 0).
    pub page: i64,
    /// Number of records to return, always within `1..=MAX_LIMIT`.
    pub limit: i64,
    /// Number of records to skip (0-based).
    pub offset: i64,
}

impl PageRequest {
    /// Build a window from already-parsed values, falling back to
    /// `default_limit` when `limit < 1`.
    pub fn new(page: i64, limit: i64, default_limit: i64) -> Self {
        let capped = limit.min(MAX_LIMIT);
        let effective = if capped < 1 {
            default_limit.clamp(1, MAX_LIMIT)
        } else {
            capped
        };
        Self {
            page,
            limit: effective,
            offset: page_offset(page, capped),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT, DEFAULT_LIMIT)
    }
}

/// `(page - 1) * limit`, or 0 when either input is < 1.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    if page < 1 || limit < 1 {
        return 0;
    }
    (page - 1).saturating_mul(limit)
}

/// Resolves `page` / `limit` query parameters with a configurable default page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageResolver {
    default_limit: i64,
}

impl PageResolver {
    pub fn new(default_limit: i64) -> Self {
        Self {
            default_limit: default_limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// Parse raw parameters. Absent (or blank) parameters take their defaults;
    /// non-integer values are a validation error.
    pub fn resolve(&self, page: Option<&str>, limit: Option<&str>) -> DomainResult<PageRequest> {
        let page = parse_param(page, DEFAULT_PAGE, "incorrect page format")?;
        let limit = parse_param(limit, self.default_limit, "incorrect limit format")?;
        Ok(PageRequest::new(page, limit, self.default_limit))
    }
}

impl Default for PageResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

/// Resolve with the default page size.
pub fn resolve_page(page: Option<&str>, limit: Option<&str>) -> DomainResult<PageRequest> {
    PageResolver::default().resolve(page, limit)
}

fn parse_param(raw: Option<&str>, default: i64, message: &'static str) -> DomainResult<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| DomainError::validation(message)),
    }
}

//! Pagination types shared by all list endpoints.

use serde::{Deserialize, Serialize};

/// Query parameters accepted by paged list endpoints.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PageQuery {
    /// Page number (0-indexed, defaults to 0)
    pub page: Option<i64>,
    /// Items per page (defaults to 12, max 100)
    pub size: Option<i64>,
    /// Sort expression, e.g. "name,asc" or "price,desc"
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A normalized request for one slice of an ordered result set.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort: Option<(String, SortDirection)>,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: page.max(0),
            size: size.clamp(1, 100),
            sort: None,
        }
    }

    pub fn with_sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort = Some((field.to_string(), direction));
        self
    }

    pub fn offset(&self) -> i64 {
        // page is client-controlled and unbounded above
        self.page.saturating_mul(self.size)
    }

    /// Build an ORDER BY clause from an allowlist of sortable columns.
    /// Unknown sort fields fall back to the default column ascending.
    pub fn order_clause(&self, allowed: &[&str], default: &str) -> String {
        let (column, direction) = match &self.sort {
            Some((field, dir)) if allowed.contains(&field.as_str()) => {
                (field.as_str(), dir.as_sql())
            }
            _ => (default, "ASC"),
        };
        format!("ORDER BY {} {}", column, direction)
    }
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        let mut request = PageRequest::new(query.page.unwrap_or(0), query.size.unwrap_or(12));
        request.sort = query.sort.as_deref().and_then(parse_sort);
        request
    }
}

fn parse_sort(value: &str) -> Option<(String, SortDirection)> {
    let mut parts = value.splitn(2, ',');
    let field = parts.next()?.trim();
    if field.is_empty() {
        return None;
    }
    let direction = match parts.next().map(str::trim) {
        Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    Some((field.to_string(), direction))
}

/// One page of results plus paging metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: &PageRequest) -> Self {
        let total_pages = (total as f64 / request.size as f64).ceil() as i64;
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
            total_pages,
        }
    }
}

//! Offset pagination types shared by the list endpoints.
//!
//! Every list endpoint takes `page`/`perPage` query parameters and returns
//! its rows together with the counted total, so clients can re-issue page 1
//! with fresh totals whenever a filter changes.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not specify one.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Upper bound on the page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    /// The requested page, 1-based, never below 1.
    pub fn page_number(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// The effective page size, clamped to 1..=MAX_PER_PAGE.
    pub fn limit(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Row offset for the effective page and size.
    pub fn offset(&self) -> i64 {
        (self.page_number() - 1) * self.limit()
    }
}

/// One page of results plus the counted totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Builds a page from query results and the matching count.
    pub fn new(data: Vec<T>, params: &PageParams, total: i64) -> Self {
        let per_page = params.limit();
        Self {
            data,
            page: params.page_number(),
            per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }

    /// Maps the row type while keeping the page metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page_number(), 1);
        assert_eq!(params.limit(), DEFAULT_PER_PAGE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_page_floor() {
        let params = PageParams {
            page: Some(0),
            per_page: None,
        };
        assert_eq!(params.page_number(), 1);

        let params = PageParams {
            page: Some(-3),
            per_page: None,
        };
        assert_eq!(params.page_number(), 1);
    }

    #[test]
    fn test_per_page_clamped() {
        let params = PageParams {
            page: None,
            per_page: Some(500),
        };
        assert_eq!(params.limit(), MAX_PER_PAGE);

        let params = PageParams {
            page: None,
            per_page: Some(0),
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_offset() {
        let params = PageParams {
            page: Some(3),
            per_page: Some(20),
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PageParams {
            page: Some(1),
            per_page: Some(20),
        };
        let page = Page::new(vec![1, 2, 3], &params, 41);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_total_pages_empty() {
        let params = PageParams::default();
        let page: Page<i32> = Page::new(vec![], &params, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let params = PageParams {
            page: Some(2),
            per_page: Some(10),
        };
        let page = Page::new(vec![1, 2], &params, 12);
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.data, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(mapped.page, 2);
        assert_eq!(mapped.total, 12);
    }

    #[test]
    fn test_serializes_camel_case() {
        let params = PageParams::default();
        let page = Page::new(vec![1], &params, 1);
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"perPage\""));
        assert!(json.contains("\"totalPages\""));
    }

    #[test]
    fn test_deserialize_params_camel_case() {
        let params: PageParams = serde_json::from_str(r#"{"page":2,"perPage":50}"#).unwrap();
        assert_eq!(params.page_number(), 2);
        assert_eq!(params.limit(), 50);
    }
}

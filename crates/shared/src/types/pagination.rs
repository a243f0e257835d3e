//! Pagination types for list interfaces.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from((self.page.saturating_sub(1)) * self.per_page)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

/// A page of results with total counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// The page number (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub per_page: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Builds a page response from items and a total count.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let per_page = request.per_page.max(1);
        let total_pages = u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page: request.page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 20);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 20);
    }

    #[test]
    fn test_page_request_offset() {
        let request = PageRequest {
            page: 3,
            per_page: 25,
        };
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn test_page_response_total_pages() {
        let request = PageRequest {
            page: 1,
            per_page: 10,
        };
        let response = PageResponse::new(vec![1, 2, 3], 31, &request);
        assert_eq!(response.total_pages, 4);
        assert_eq!(response.total, 31);
    }

    #[test]
    fn test_page_response_empty() {
        let request = PageRequest::default();
        let response: PageResponse<u8> = PageResponse::new(vec![], 0, &request);
        assert_eq!(response.total_pages, 0);
        assert!(response.items.is_empty());
    }
}

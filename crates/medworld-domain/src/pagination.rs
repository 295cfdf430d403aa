//! Pagination request and response envelope types.

use serde::{Deserialize, Serialize};

/// Pagination parameters shared across all list endpoints.
///
/// - `per_page`: 1–100, default 15
/// - `page`: ≥ 1, default 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

/// Pagination parameters for the bulk browse endpoints (`/all/...`), which
/// default to 50 per page instead of 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BulkPageRequest {
    #[serde(default = "default_bulk_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_per_page() -> u32 {
    15
}

fn default_bulk_per_page() -> u32 {
    50
}

fn default_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            page: default_page(),
        }
    }
}

impl PageRequest {
    /// Clamp `per_page` to the valid range 1–100 and `page` to ≥ 1.
    ///
    /// Call after deserializing from query params to enforce bounds.
    pub fn clamped(self) -> Self {
        Self {
            per_page: self.per_page.clamp(1, 100),
            page: self.page.max(1),
        }
    }

    /// Number of rows to skip for this page.
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

impl BulkPageRequest {
    /// Convert into a clamped [`PageRequest`].
    pub fn clamped(self) -> PageRequest {
        PageRequest {
            per_page: self.per_page,
            page: self.page,
        }
        .clamped()
    }
}

/// One page of results plus the paging metadata clients rely on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble a page from one query's rows plus the unpaged total count.
    pub fn from_parts(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_per_page_15_page_1() {
        let p = PageRequest::default();
        assert_eq!(p.per_page, 15);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn should_deserialize_defaults_when_fields_absent() {
        let p: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(p.per_page, 15);
        assert_eq!(p.page, 1);

        let b: BulkPageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(b.per_page, 50);
        assert_eq!(b.page, 1);
    }

    #[test]
    fn should_clamp_per_page_to_1_100() {
        let low = PageRequest {
            per_page: 0,
            page: 1,
        };
        assert_eq!(low.clamped().per_page, 1);

        let high = PageRequest {
            per_page: 200,
            page: 1,
        };
        assert_eq!(high.clamped().per_page, 100);

        let bulk = BulkPageRequest {
            per_page: 500,
            page: 1,
        };
        assert_eq!(bulk.clamped().per_page, 100);
    }

    #[test]
    fn should_clamp_page_to_minimum_1() {
        let p = PageRequest {
            per_page: 15,
            page: 0,
        };
        assert_eq!(p.clamped().page, 1);
    }

    #[test]
    fn should_compute_row_offset_from_page() {
        let p = PageRequest {
            per_page: 15,
            page: 1,
        };
        assert_eq!(p.offset(), 0);

        let p = PageRequest {
            per_page: 15,
            page: 3,
        };
        assert_eq!(p.offset(), 30);
    }

    #[test]
    fn should_serialize_page_envelope_fields() {
        let page = Page::from_parts(vec![1, 2, 3], 42, PageRequest::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["current_page"], 1);
        assert_eq!(json["per_page"], 15);
        assert_eq!(json["total"], 42);
    }
}

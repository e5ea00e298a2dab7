//! 分页元数据

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// `max(1, ceil(total / limit))`. A zero limit is treated as one.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1)).max(1)
}

impl PaginationInfo {
    /// Clamps `requested_page` into `[1, total_pages]`.
    pub fn new(requested_page: u64, limit: u64, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total_pages(total, limit);
        Self {
            page: requested_page.clamp(1, total_pages),
            limit,
            total,
            total_pages,
        }
    }

    pub fn empty(limit: u64) -> Self {
        Self::new(1, limit, 0)
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    /// Takes this page's slice out of the fully filtered list.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_never_below_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(7, 1), 7);
    }

    #[test]
    fn test_page_is_clamped() {
        assert_eq!(PaginationInfo::new(0, 10, 25).page, 1);
        assert_eq!(PaginationInfo::new(9, 10, 25).page, 3);
        assert_eq!(PaginationInfo::new(5, 10, 0).page, 1);
    }

    #[test]
    fn test_first_page_of_twenty_five() {
        let info = PaginationInfo::new(1, 10, 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_more());
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(info.slice(rows), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_last_partial_page() {
        let info = PaginationInfo::new(3, 10, 25);
        assert!(!info.has_more());
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(info.slice(rows), (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(PaginationInfo::empty(10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"page": 1, "limit": 10, "total": 0, "totalPages": 1})
        );
    }
}

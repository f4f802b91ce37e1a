use serde::{Deserialize, Serialize};

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
    /// Total rows matching the query across all pages
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, size: u32, total: i64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            (total + i64::from(size) - 1) / i64::from(size)
        };
        Self {
            items,
            page,
            size,
            total,
            total_pages,
        }
    }

    pub fn empty(page: u32, size: u32) -> Self {
        Self::new(Vec::new(), page, size, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 0, 10, 21);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_total_pages_exact_fit() {
        let page: Page<u8> = Page::new(vec![], 0, 10, 20);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u8> = Page::empty(3, 10);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 3);
    }


    #[test]
    fn test_serializes_camel_case() {
        let page: Page<u8> = Page::new(vec![7], 0, 1, 1);
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["totalPages"], 1);
        assert_eq!(value["items"][0], 7);
    }
}

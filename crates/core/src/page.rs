use serde::{Deserialize, Serialize};

/// Page size applied when a request does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Hard ceiling on the page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One page of a filtered resource listing.
///
/// This is the shape every list endpoint returns inside the success
/// envelope: `{items, total, page, pageSize, totalPages}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of matching items before pagination.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// `ceil(total / pageSize)`; 0 when the result set is empty.
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assemble a page, deriving `total_pages` from `total` and `page_size`.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages = u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    /// Whether pagination controls are worth rendering at all.
    #[must_use]
    pub fn has_multiple_pages(&self) -> bool {
        self.total_pages > 1
    }

    /// Map the item type while keeping the paging envelope intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

/// Pagination parameters common to every list request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    /// Clamp out-of-range values rather than rejecting the request.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of items to skip for this page.
    #[must_use]
    pub fn offset(self) -> usize {
        let q = self.normalized();
        (q.page as usize - 1) * q.page_size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_division() {
        let page: Page<u32> = Page::new(vec![1, 2, 3], 7, 1, 3);
        assert_eq!(page.total_pages, 3);
        let exact: Page<u32> = Page::new(vec![], 20, 1, 20);
        assert_eq!(exact.total_pages, 1);
        let empty: Page<u32> = Page::new(vec![], 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_multiple_pages());
    }

    #[test]
    fn page_serializes_camel_case() {
        let page: Page<u32> = Page::new(vec![1], 1, 1, 20);
        let value = serde_json::to_value(&page).unwrap();
        assert!(value.get("pageSize").is_some());
        assert!(value.get("totalPages").is_some());
    }

    #[test]
    fn query_normalization_clamps() {
        let q = PageQuery {
            page: 0,
            page_size: 10_000,
        }
        .normalized();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, MAX_PAGE_SIZE);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            page: 3,
            page_size: 25,
        };
        assert_eq!(q.offset(), 50);
    }
}

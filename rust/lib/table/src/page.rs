use std::ops::Range;

/// Page count for `count` rows. A page size of 0 disables paging, which is
/// one page holding everything. Never less than 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

/// Clamp a requested 1-based page into `[1, total]`.
pub fn clamp_page(requested: usize, total: usize) -> usize {
    requested.clamp(1, total.max(1))
}

/// Index range of the rows on `page` (1-based, clamped).
pub fn page_range(count: usize, page_size: usize, page: usize) -> Range<usize> {
    if page_size == 0 {
        return 0..count;
    }
    let page = clamp_page(page, total_pages(count, page_size));
    let start = (page - 1) * page_size;
    start.min(count)..(start + page_size).min(count)
}

/// Pagination summary handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub page_size: usize,
}

impl PageInfo {
    pub fn new(requested: usize, total_rows: usize, page_size: usize) -> Self {
        let total = total_pages(total_rows, page_size);
        Self {
            page: clamp_page(requested, total),
            total_pages: total,
            total_rows,
            page_size,
        }
    }

    /// Whether page controls should be shown at all.
    pub fn has_controls(&self) -> bool {
        self.page_size > 0 && self.total_pages > 1
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_five_rows_in_pages_of_twenty() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(clamp_page(5, 3), 3);
        assert_eq!(page_range(45, 20, 3), 40..45);
        assert_eq!(page_range(45, 20, 5), 40..45);
        assert_eq!(page_range(45, 20, 1), 0..20);
    }

    #[test]
    fn shrinking_data_clamps() {
        assert_eq!(total_pages(10, 20), 1);
        assert_eq!(clamp_page(3, total_pages(10, 20)), 1);
        assert_eq!(page_range(10, 20, 3), 0..10);
    }

    #[test]
    fn zero_page_size_disables_paging() {
        assert_eq!(total_pages(500, 0), 1);
        assert_eq!(page_range(500, 0, 7), 0..500);
        assert!(!PageInfo::new(1, 500, 0).has_controls());
    }

    #[test]
    fn empty_data_is_one_page() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(page_range(0, 20, 1), 0..0);
        assert_eq!(clamp_page(0, 1), 1);
    }

    #[test]
    fn page_info_navigation() {
        let info = PageInfo::new(2, 45, 20);
        assert!(info.has_controls());
        assert!(info.has_prev());
        assert!(info.has_next());
        let last = PageInfo::new(9, 45, 20);
        assert_eq!(last.page, 3);
        assert!(!last.has_next());
    }
}

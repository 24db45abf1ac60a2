//! Page window for the product listing footer.

use serde::Serialize;

/// Default number of products per listing page.
pub const ITEMS_PER_PAGE: u32 = 12;

/// The slice of results a listing page covers, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: u32,
    pub page_count: u32,
    pub first: u32,
    pub last: u32,
    pub total_results: u32,
}

impl PageWindow {
    /// Window for `page` of `total_results` with `per_page` results a page.
    ///
    /// Pages past the end are clamped to the last page; an empty result set
    /// yields a single empty page.
    #[must_use]
    pub fn new(page: u32, total_results: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let page_count = total_results.div_ceil(per_page).max(1);
        let page = page.clamp(1, page_count);

        if total_results == 0 {
            return Self {
                page,
                page_count,
                first: 0,
                last: 0,
                total_results,
            };
        }

        // `total_results` is remote input; the last page can reach `u32::MAX`
        let first = (page - 1).saturating_mul(per_page).saturating_add(1);
        let last = page.saturating_mul(per_page).min(total_results);

        Self {
            page,
            page_count,
            first,
            last,
            total_results,
        }
    }

    /// Footer text, e.g. "Showing 13 to 20 of 20 results".
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} results",
            self.first, self.last, self.total_results
        )
    }
}

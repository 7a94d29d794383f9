//! Page layout: the ordered sequence of metadata pages plus the column
//! text pool bound to it (spec.md §4.H "Page layout").
//!
//! Subheaders are added in a fixed order (§4.H's numbered list); when the
//! current page has no room, it is finalised and archived, a fresh page
//! is opened, and the add is retried. [`PageLayout`] also implements
//! [`LayoutView`] so `RowSize` and `SubheaderCounts` can resolve
//! cross-references once every other subheader has been placed.

use crate::error::Result;
use crate::page::Page;
use crate::subheader::{Location, Subheader};

/// A [`LayoutView`] that reports every signature absent — used by unit
/// tests exercising a single subheader's `write` in isolation.
pub struct EmptyLayoutView;

impl crate::subheader::LayoutView for EmptyLayoutView {
    fn for_each_subheader(&self, _visitor: &mut dyn FnMut(Location, u64)) {}
}

/// Owns every finalised metadata page plus the page currently being
/// filled.
pub struct PageLayout {
    page_size: usize,
    row_length: usize,
    finalised: Vec<Page>,
    current: Page,
}

impl PageLayout {
    #[must_use]
    pub fn new(page_size: usize, row_length: usize) -> Self {
        Self {
            page_size,
            row_length,
            finalised: Vec::new(),
            current: Page::new(page_size, row_length),
        }
    }

    /// 1-based page number of the page currently being filled.
    #[must_use]
    pub fn current_page_number(&self) -> u64 {
        self.finalised.len() as u64 + 1
    }

    #[must_use]
    pub fn current_page(&self) -> &Page {
        &self.current
    }

    #[must_use]
    pub fn current_page_mut(&mut self) -> &mut Page {
        &mut self.current
    }

    #[must_use]
    pub fn finalised_pages(&self) -> &[Page] {
        &self.finalised
    }

    /// Bytes remaining for a new `ColumnText` chunk on the current page —
    /// the callback [`crate::text_pool::TextPool::add`] expects.
    #[must_use]
    pub fn remaining_text_bytes(&self) -> usize {
        self.current.remaining_text_bytes()
    }

    /// Adds `subheader` to the current page, rolling to a fresh page on
    /// overflow. Returns the subheader's 1-based `(page, position)`.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::error::Error::Invariant`] if a subheader alone
    /// is too large to ever fit on an empty page.
    pub fn add_subheader(&mut self, subheader: Box<dyn Subheader>) -> Result<Location> {
        if !self.current.fits(subheader.size()) {
            self.roll_page();
        }
        self.current.add_subheader(subheader)?;
        let page = self.current_page_number();
        let position = self.current.subheader_count() as u32;
        Ok(Location { page, position })
    }

    fn roll_page(&mut self) {
        self.current.finalise();
        let finished = std::mem::replace(&mut self.current, Page::new(self.page_size, self.row_length));
        self.finalised.push(finished);
    }

    /// Finalises the current metadata page without opening a new one —
    /// it becomes the exporter's first "current" data-eligible page
    /// (spec.md §4.I, "mark the final metadata page as mixed").
    pub fn finalise_current(&mut self) {
        self.current.finalise();
    }

    /// Total number of metadata pages: every finalised page plus the
    /// still-open current one.
    #[must_use]
    pub fn total_metadata_pages(&self) -> u64 {
        self.finalised.len() as u64 + 1
    }

    /// Consumes the layout, returning the still-open "current" page so the
    /// exporter can retain it (already finalised via
    /// [`Self::finalise_current`]) as the page `write_row` appends to.
    #[must_use]
    pub fn into_current_page(self) -> Page {
        self.current
    }
}

impl crate::subheader::LayoutView for PageLayout {
    fn for_each_subheader(&self, visitor: &mut dyn FnMut(Location, u64)) {
        for (page_index, page) in self.finalised.iter().chain(std::iter::once(&self.current)).enumerate() {
            let page_number = page_index as u64 + 1;
            for (position_index, signature) in page.signatures().enumerate() {
                visitor(
                    Location {
                        page: page_number,
                        position: position_index as u32 + 1,
                    },
                    signature,
                );
            }
        }
    }
}

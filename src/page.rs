//! Fixed-size pages: the subheader index grows forward from offset 40,
//! subheader bodies grow backward from the page's end, and row bytes are
//! packed into the space left between (spec.md §4.G "Page").

use crate::error::{Error, ExportStage, Result};
use crate::subheader::{Subheader, Terminal};

/// Fixed header region every page reserves before its subheader index.
const PAGE_HEADER_LEN: usize = 40;
/// Bytes one subheader index entry occupies.
const INDEX_ENTRY_LEN: usize = 24;

/// Page kind tag written at offset 32 of the page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Metadata,
    Data,
    Mixed,
}

impl PageKind {
    const fn code(self) -> u16 {
        match self {
            Self::Metadata => 0x0000,
            Self::Data => 0x0100,
            Self::Mixed => 0x0200,
        }
    }
}

/// Computes the page size used for every page in a dataset: the largest
/// of a 64 KiB floor and `40 + row_length + 1`, rounded up to 1,024
/// (spec.md §4.G).
#[must_use]
pub fn page_size_for(row_length: usize) -> usize {
    crate::bytes::align(0x1_0000.max(PAGE_HEADER_LEN + row_length + 1), 1024)
}

struct IndexEntry {
    body_offset: u64,
    body_length: u64,
    compression_code: u8,
    type_code: u8,
}

/// One fixed-size page under construction: a sequence of subheaders plus
/// a sequence of encoded row bytes, packed front-to-back and back-to-
/// front respectively.
pub struct Page {
    size: usize,
    row_length: usize,
    subheaders: Vec<Box<dyn Subheader>>,
    rows: Vec<Vec<u8>>,
    index_cursor: usize,
    data_cursor: usize,
    max_observations: Option<usize>,
    finalised: bool,
}

impl Page {
    /// Creates an empty page of `size` bytes for rows of `row_length`
    /// bytes.
    #[must_use]
    pub fn new(size: usize, row_length: usize) -> Self {
        Self {
            size,
            row_length,
            subheaders: Vec::new(),
            rows: Vec::new(),
            index_cursor: PAGE_HEADER_LEN,
            data_cursor: size,
            max_observations: None,
            finalised: false,
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn subheader_count(&self) -> usize {
        self.subheaders.len()
    }

    /// Signatures of this page's subheaders, in emission order — used by
    /// [`crate::page_layout::PageLayout`]'s `LayoutView` implementation.
    pub fn signatures(&self) -> impl Iterator<Item = u64> + '_ {
        self.subheaders.iter().map(|s| s.signature())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Bytes remaining for a new `ColumnText` subheader on this page,
    /// rounded down to a 4-byte multiple — used by [`crate::text_pool`]
    /// to size its next chunk (spec.md §4.F).
    #[must_use]
    pub fn remaining_text_bytes(&self) -> usize {
        let available = self.data_cursor.saturating_sub(self.index_cursor + INDEX_ENTRY_LEN * 2);
        (available / 4) * 4
    }

    /// Reports whether a subheader of `body_len` bytes would fit on this
    /// page, reserving an extra index entry's worth of room for the
    /// eventual `Terminal` marker (spec.md §4.G).
    #[must_use]
    pub fn fits(&self, body_len: usize) -> bool {
        self.index_cursor + INDEX_ENTRY_LEN + body_len + INDEX_ENTRY_LEN <= self.data_cursor
    }

    /// Appends `subheader` to this page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if [`Self::fits`] would have reported
    /// `false` for this subheader's size — callers are expected to check
    /// first and roll to a fresh page instead.
    pub fn add_subheader(&mut self, subheader: Box<dyn Subheader>) -> Result<()> {
        let needed_body = subheader.size();
        if !self.fits(needed_body) {
            return Err(Error::invariant(
                ExportStage::Page { index: 0 },
                "not enough remaining space on page for subheader",
            ));
        }
        self.data_cursor -= needed_body;
        self.index_cursor += INDEX_ENTRY_LEN;
        self.subheaders.push(subheader);
        Ok(())
    }

    /// Commits a `Terminal` marker and computes `max_observations`.
    /// Idempotent.
    pub fn finalise(&mut self) {
        if self.finalised {
            return;
        }
        if !self.subheaders.is_empty() {
            self.data_cursor -= Terminal.size();
            self.index_cursor += INDEX_ENTRY_LEN;
            self.subheaders.push(Box::new(Terminal));
        }
        let free_bits = 8 * (self.data_cursor.saturating_sub(self.index_cursor));
        let per_row_bits = 8 * self.row_length + 1;
        self.max_observations = Some(if per_row_bits == 0 { 0 } else { free_bits / per_row_bits });
        self.finalised = true;
    }

    #[must_use]
    pub fn max_observations(&self) -> usize {
        self.max_observations.unwrap_or(0)
    }

    /// Appends one already-encoded row's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the page already holds
    /// `max_observations` rows.
    pub fn add_row(&mut self, row: Vec<u8>) -> Result<()> {
        if self.rows.len() >= self.max_observations() {
            return Err(Error::invariant(ExportStage::Page { index: 0 }, "page is full"));
        }
        self.rows.push(row);
        Ok(())
    }

    fn kind(&self) -> PageKind {
        if self.subheaders.is_empty() {
            PageKind::Data
        } else if self.rows.is_empty() {
            PageKind::Metadata
        } else {
            PageKind::Mixed
        }
    }

    /// Writes this page's full byte image, including the 40-byte page
    /// header, into `buf` (which must be exactly [`Self::size`] bytes).
    ///
    /// # Panics
    ///
    /// Panics if `buf.len() != self.size()` or if `finalise` was never
    /// called.
    pub fn write(&self, buf: &mut [u8], sequence: u32, view: &dyn crate::subheader::LayoutView) {
        assert!(self.finalised, "Page::write called before finalise");
        assert_eq!(buf.len(), self.size, "page buffer size mismatch");
        buf.fill(0);

        let mut index_entries = Vec::with_capacity(self.subheaders.len());
        let mut body_cursor = self.size;
        for subheader in &self.subheaders {
            let len = subheader.size();
            body_cursor -= len;
            if len > 0 {
                subheader.write(buf, body_cursor, view);
            }
            index_entries.push(IndexEntry {
                body_offset: body_cursor as u64,
                body_length: len as u64,
                compression_code: subheader.compression_code(),
                type_code: subheader.type_code(),
            });
        }

        let mut index_offset = PAGE_HEADER_LEN;
        for entry in &index_entries {
            crate::bytes::write_u64_le(buf, index_offset, entry.body_offset);
            crate::bytes::write_u64_le(buf, index_offset + 8, entry.body_length);
            buf[index_offset + 16] = entry.compression_code;
            buf[index_offset + 17] = entry.type_code;
            index_offset += INDEX_ENTRY_LEN;
        }

        let mut row_offset = self.index_cursor;
        for row in &self.rows {
            buf[row_offset..row_offset + row.len()].copy_from_slice(row);
            row_offset += row.len();
        }

        let free_bytes = body_cursor.saturating_sub(row_offset);
        crate::bytes::write_u32_le(buf, 0, sequence);
        crate::bytes::write_u32_le(buf, 24, free_bytes as u32);
        crate::bytes::write_u16_le(buf, 32, self.kind().code());
        crate::bytes::write_u16_le(
            buf,
            34,
            (self.subheaders.len() + self.rows.len()) as u16,
        );
        crate::bytes::write_u16_le(buf, 36, self.subheaders.len() as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_layout::EmptyLayoutView;
    use crate::subheader::ColumnSize;

    #[test]
    fn page_size_respects_floor_and_alignment() {
        assert_eq!(page_size_for(16), 0x1_0000);
        assert_eq!(page_size_for(1_000_000), crate::bytes::align(40 + 1_000_000 + 1, 1024));
    }

    #[test]
    fn empty_page_is_written_as_data_kind() {
        let mut page = Page::new(1024, 8);
        page.finalise();
        let mut buf = vec![0u8; 1024];
        page.write(&mut buf, 0xAABB_CCDD, &EmptyLayoutView);
        assert_eq!(u16::from_le_bytes(buf[32..34].try_into().unwrap()), PageKind::Data.code());
    }

    #[test]
    fn adding_subheader_advances_cursors_and_allocates_terminal_on_finalise() {
        let mut page = Page::new(1024, 8);
        page.add_subheader(Box::new(ColumnSize::new(2))).unwrap();
        assert_eq!(page.subheader_count(), 1);
        page.finalise();
        assert_eq!(page.subheader_count(), 2, "Terminal appended on finalise");
    }

    #[test]
    fn full_page_rejects_additional_rows() {
        let mut page = Page::new(1024, 980);
        page.finalise();
        let max = page.max_observations();
        for _ in 0..max {
            page.add_row(vec![0u8; 980]).unwrap();
        }
        assert!(page.add_row(vec![0u8; 980]).is_err());
    }
}

//! `SubheaderCounts` subheader: a 600-byte fixed record tracking where
//! each significant subheader kind first and last appears (spec.md §4.E
//! "SubheaderCounts").

use std::cell::Cell;
use std::rc::Rc;

use super::{
    LayoutView, Subheader, SIG_COLUMN_ATTRS, SIG_COLUMN_LIST, SIG_COLUMN_NAME, SIG_COLUMN_TEXT,
    SIG_SUBHEADER_COUNTS, SIG_UNKNOWN_F9, SIG_UNKNOWN_FA, SIG_UNKNOWN_FB,
};
use crate::bytes::{write_u32_le, write_u64_le};

const SIZE: usize = 600;
const RECORD_SIZE: usize = 40;
const RECORDS_START: usize = 24;

/// The 7 signature kinds `SubheaderCounts` tracks first/last-appearance
/// locations for, in the fixed order SAS emits them.
const TRACKED: [u64; 7] = [
    SIG_COLUMN_ATTRS,
    SIG_COLUMN_TEXT,
    SIG_COLUMN_NAME,
    SIG_COLUMN_LIST,
    SIG_UNKNOWN_FB,
    SIG_UNKNOWN_FA,
    SIG_UNKNOWN_F9,
];

/// Like [`super::RowSize`], `SubheaderCounts` needs the largest payload
/// size across every variable-size subheader — not known until the text
/// pool, `ColumnName`, `ColumnAttributes`, and `ColumnList` subheaders
/// have all been built — so that one field lives behind a `Cell`.
#[derive(Debug, Clone)]
pub struct SubheaderCounts {
    max_payload_size: Cell<u64>,
}

impl SubheaderCounts {
    #[must_use]
    pub fn new(max_payload_size: u64) -> Self {
        Self {
            max_payload_size: Cell::new(max_payload_size),
        }
    }

    /// Replaces the tracked maximum payload size.
    pub fn update_max_payload_size(&self, value: u64) {
        self.max_payload_size.set(value);
    }
}

impl Subheader for Rc<SubheaderCounts> {
    fn signature(&self) -> u64 {
        (**self).signature()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn write(&self, buf: &mut [u8], offset: usize, view: &dyn LayoutView) {
        (**self).write(buf, offset, view);
    }

    fn type_code(&self) -> u8 {
        (**self).type_code()
    }

    fn compression_code(&self) -> u8 {
        (**self).compression_code()
    }
}

impl Subheader for SubheaderCounts {
    fn signature(&self) -> u64 {
        SIG_SUBHEADER_COUNTS
    }

    fn size(&self) -> usize {
        SIZE
    }

    fn write(&self, buf: &mut [u8], offset: usize, view: &dyn LayoutView) {
        let field = &mut buf[offset..offset + SIZE];
        field.fill(0);
        write_u64_le(field, 0, SIG_SUBHEADER_COUNTS);

        let mut present_count = 0u32;
        for (i, &signature) in TRACKED.iter().enumerate() {
            let first = view.first_location(signature);
            let last = view.last_location(signature);
            if first.is_present() {
                present_count += 1;
            }
            let record_offset = RECORDS_START + i * RECORD_SIZE;
            write_u64_le(field, record_offset, signature);
            write_u64_le(field, record_offset + 8, first.page);
            write_u32_le(field, record_offset + 16, first.position);
            write_u64_le(field, record_offset + 20, last.page);
            write_u32_le(field, record_offset + 28, last.position);
        }

        let totals_offset = RECORDS_START + TRACKED.len() * RECORD_SIZE;
        write_u64_le(field, totals_offset, self.max_payload_size.get());
        write_u32_le(field, totals_offset + 8, present_count);
        write_u32_le(field, totals_offset + 12, TRACKED.len() as u32);
    }

    fn type_code(&self) -> u8 {
        0
    }

    fn compression_code(&self) -> u8 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_layout::EmptyLayoutView;

    #[test]
    fn absent_signatures_report_zero_present_count() {
        let counts = SubheaderCounts::new(0);
        let mut buf = vec![0u8; SIZE];
        counts.write(&mut buf, 0, &EmptyLayoutView);
        let totals_offset = RECORDS_START + TRACKED.len() * RECORD_SIZE;
        let present = u32::from_le_bytes(buf[totals_offset + 8..totals_offset + 12].try_into().unwrap());
        assert_eq!(present, 0);
        let tracked = u32::from_le_bytes(buf[totals_offset + 12..totals_offset + 16].try_into().unwrap());
        assert_eq!(tracked, 7);
    }
}

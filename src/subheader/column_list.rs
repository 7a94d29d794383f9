//! `ColumnList` subheader: a fixed preamble followed by one 2-byte entry
//! per variable (spec.md §4.E "ColumnList").

use super::{write_variable_frame, LayoutView, Subheader, SIG_COLUMN_LIST, VARIABLE_FRAME_OVERHEAD};
use crate::bytes::write_u16_le;

/// Largest number of variable entries a single `ColumnList` subheader may
/// carry.
pub const MAX_ENTRIES: usize = 16_345;

const PREAMBLE_LEN: usize = 38;
const LIST_MAGIC: u16 = 0x7FC8;

#[derive(Debug, Clone)]
pub struct ColumnList {
    /// Entries for this chunk: `k + 1` for the `k`-th described variable,
    /// `0` for the reserved trailing slots (spec.md's "value `k+1` for
    /// `k<total_variables`, else 0").
    entries: Vec<u16>,
    total_variables: u16,
}

impl ColumnList {
    /// # Panics
    ///
    /// Panics if `entries.len()` exceeds [`MAX_ENTRIES`].
    #[must_use]
    pub fn new(entries: Vec<u16>, total_variables: u16) -> Self {
        assert!(entries.len() <= MAX_ENTRIES, "ColumnList chunk exceeds {MAX_ENTRIES} entries");
        Self {
            entries,
            total_variables,
        }
    }

    fn payload_len(&self) -> usize {
        PREAMBLE_LEN + self.entries.len() * 2
    }
}

impl Subheader for ColumnList {
    fn signature(&self) -> u64 {
        SIG_COLUMN_LIST
    }

    fn size(&self) -> usize {
        self.payload_len() + VARIABLE_FRAME_OVERHEAD
    }

    fn write(&self, buf: &mut [u8], offset: usize, _view: &dyn LayoutView) {
        let payload_start = offset + 16;
        let payload_len = self.payload_len();
        let payload = &mut buf[payload_start..payload_start + payload_len];
        payload.fill(0);

        write_u16_le(payload, 24, self.entries.len() as u16);
        write_u16_le(payload, 26, self.total_variables);
        write_u16_le(payload, 28, self.total_variables);
        write_u16_le(payload, 30, LIST_MAGIC);

        for (i, &value) in self.entries.iter().enumerate() {
            write_u16_le(payload, PREAMBLE_LEN + i * 2, value);
        }

        write_variable_frame(buf, offset, SIG_COLUMN_LIST, payload_len);
    }

    fn type_code(&self) -> u8 {
        1
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
    fn preamble_carries_magic_and_totals() {
        let subheader = ColumnList::new(vec![1, 2, 0], 2);
        let mut buf = vec![0u8; subheader.size()];
        subheader.write(&mut buf, 0, &EmptyLayoutView);
        let preamble_start = 16 + 24;
        assert_eq!(
            u16::from_le_bytes(buf[preamble_start + 6..preamble_start + 8].try_into().unwrap()),
            LIST_MAGIC
        );
        let entries_start = 16 + PREAMBLE_LEN;
        assert_eq!(u16::from_le_bytes(buf[entries_start..entries_start + 2].try_into().unwrap()), 1);
        assert_eq!(
            u16::from_le_bytes(buf[entries_start + 4..entries_start + 6].try_into().unwrap()),
            0
        );
    }
}

//! `ColumnName` subheader: a chunk of up to 4,089 text-pool references to
//! variable names (spec.md §4.E "ColumnName").

use super::{write_variable_frame, LayoutView, Subheader, SIG_COLUMN_NAME, VARIABLE_FRAME_OVERHEAD};
use crate::bytes::write_u16_le;

/// The largest number of variables a single `ColumnName` subheader may
/// describe.
pub const MAX_ENTRIES: usize = 4_089;

/// One variable's name reference: text-pool subheader index, byte offset
/// from that subheader's signature, and byte length.
#[derive(Debug, Clone, Copy)]
pub struct NameEntry {
    pub text_subheader_index: u16,
    pub offset_from_signature: u16,
    pub length: u16,
}

#[derive(Debug, Clone)]
pub struct ColumnName {
    entries: Vec<NameEntry>,
}

impl ColumnName {
    /// # Panics
    ///
    /// Panics if `entries` exceeds [`MAX_ENTRIES`] — callers are expected
    /// to have already split the variable list into chunks.
    #[must_use]
    pub fn new(entries: Vec<NameEntry>) -> Self {
        assert!(entries.len() <= MAX_ENTRIES, "ColumnName chunk exceeds {MAX_ENTRIES} entries");
        Self { entries }
    }

    fn payload_len(&self) -> usize {
        self.entries.len() * 8 + 8
    }
}

impl Subheader for ColumnName {
    fn signature(&self) -> u64 {
        SIG_COLUMN_NAME
    }

    fn size(&self) -> usize {
        self.payload_len() + VARIABLE_FRAME_OVERHEAD
    }

    fn write(&self, buf: &mut [u8], offset: usize, _view: &dyn LayoutView) {
        let payload_start = offset + 16;
        let payload_len = self.payload_len();
        let payload = &mut buf[payload_start..payload_start + payload_len];
        payload.fill(0);
        for (i, entry) in self.entries.iter().enumerate() {
            let entry_offset = 8 + i * 8;
            write_u16_le(payload, entry_offset, entry.text_subheader_index);
            write_u16_le(payload, entry_offset + 2, entry.offset_from_signature);
            write_u16_le(payload, entry_offset + 4, entry.length);
        }
        write_variable_frame(buf, offset, SIG_COLUMN_NAME, payload_len);
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
    fn payload_size_matches_formula() {
        let subheader = ColumnName::new(vec![NameEntry {
            text_subheader_index: 0,
            offset_from_signature: 4,
            length: 2,
        }]);
        assert_eq!(subheader.payload_len(), 16);
        let mut buf = vec![0u8; subheader.size()];
        subheader.write(&mut buf, 0, &EmptyLayoutView);
        assert_eq!(u16::from_le_bytes(buf[24..26].try_into().unwrap()), 4);
        assert_eq!(u16::from_le_bytes(buf[26..28].try_into().unwrap()), 2);
    }

    #[test]
    #[should_panic(expected = "exceeds 4089 entries")]
    fn rejects_too_many_entries() {
        let entries = vec![
            NameEntry {
                text_subheader_index: 0,
                offset_from_signature: 0,
                length: 0,
            };
            MAX_ENTRIES + 1
        ];
        ColumnName::new(entries);
    }
}

//! `ColumnText` subheader: one chunk of the column text pool's payload
//! (spec.md §4.E "ColumnText", §4.F "Column text pool").
//!
//! The pool in [`crate::text_pool`] owns string interning and chunking;
//! this type is the thin frame around an already-assembled payload.

use super::{write_variable_frame, LayoutView, Subheader, SIG_COLUMN_TEXT, VARIABLE_FRAME_OVERHEAD};

#[derive(Debug, Clone)]
pub struct ColumnText {
    payload: Vec<u8>,
}

impl ColumnText {
    #[must_use]
    pub const fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

impl Subheader for ColumnText {
    fn signature(&self) -> u64 {
        SIG_COLUMN_TEXT
    }

    fn size(&self) -> usize {
        self.payload.len() + VARIABLE_FRAME_OVERHEAD
    }

    fn write(&self, buf: &mut [u8], offset: usize, _view: &dyn LayoutView) {
        let payload_start = offset + 16;
        buf[payload_start..payload_start + self.payload.len()].copy_from_slice(&self.payload);
        write_variable_frame(buf, offset, SIG_COLUMN_TEXT, self.payload.len());
    }

    fn type_code(&self) -> u8 {
        1
    }

    fn compression_code(&self) -> u8 {
        0
    }
}

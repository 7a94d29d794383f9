//! `ColumnFormat` subheader: one fixed 64-byte record per variable,
//! carrying format widths/digits and text-pool references to format
//! names and the variable's label (spec.md §4.E "ColumnFormat").

use super::{LayoutView, Subheader, SIG_COLUMN_FORMAT};
use crate::bytes::{write_u16_le, write_u64_le};

const SIZE: usize = 64;

/// A 6-byte text-pool reference: subheader index, offset from signature,
/// byte length.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRef {
    pub subheader_index: u16,
    pub offset_from_signature: u16,
    pub length: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnFormat {
    pub output_width: u16,
    pub output_decimals: u16,
    pub input_width: u16,
    pub input_decimals: u16,
    pub input_format_name: TextRef,
    pub output_format_name: TextRef,
    pub label: TextRef,
}

fn write_text_ref(buf: &mut [u8], offset: usize, text_ref: TextRef) {
    write_u16_le(buf, offset, text_ref.subheader_index);
    write_u16_le(buf, offset + 2, text_ref.offset_from_signature);
    write_u16_le(buf, offset + 4, text_ref.length);
}

impl Subheader for ColumnFormat {
    fn signature(&self) -> u64 {
        SIG_COLUMN_FORMAT
    }

    fn size(&self) -> usize {
        SIZE
    }

    fn write(&self, buf: &mut [u8], offset: usize, _view: &dyn LayoutView) {
        let field = &mut buf[offset..offset + SIZE];
        field.fill(0);
        write_u64_le(field, 0, SIG_COLUMN_FORMAT);
        write_u16_le(field, 24, self.output_width);
        write_u16_le(field, 26, self.output_decimals);
        write_u16_le(field, 28, self.input_width);
        write_u16_le(field, 30, self.input_decimals);
        write_text_ref(field, 40, self.input_format_name);
        write_text_ref(field, 46, self.output_format_name);
        write_text_ref(field, 52, self.label);
    }

    fn type_code(&self) -> u8 {
        0
    }

    fn compression_code(&self) -> u8 {
        0
    }
}

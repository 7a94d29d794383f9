//! `ColumnSize` subheader: a 24-byte fixed record holding the variable
//! count (spec.md §4.E "ColumnSize").

use super::{LayoutView, Subheader, SIG_COLUMN_SIZE};
use crate::bytes::write_u64_le;

const SIZE: usize = 24;

#[derive(Debug, Clone, Copy)]
pub struct ColumnSize {
    variable_count: u64,
}

impl ColumnSize {
    #[must_use]
    pub const fn new(variable_count: u64) -> Self {
        Self { variable_count }
    }
}

impl Subheader for ColumnSize {
    fn signature(&self) -> u64 {
        SIG_COLUMN_SIZE
    }

    fn size(&self) -> usize {
        SIZE
    }

    fn write(&self, buf: &mut [u8], offset: usize, _view: &dyn LayoutView) {
        let field = &mut buf[offset..offset + SIZE];
        field.fill(0);
        write_u64_le(field, 0, SIG_COLUMN_SIZE);
        write_u64_le(field, 8, self.variable_count);
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
    fn writes_signature_and_count() {
        let subheader = ColumnSize::new(3);
        let mut buf = vec![0xAAu8; SIZE];
        subheader.write(&mut buf, 0, &EmptyLayoutView);
        assert_eq!(u64::from_le_bytes(buf[0..8].try_into().unwrap()), SIG_COLUMN_SIZE);
        assert_eq!(u64::from_le_bytes(buf[8..16].try_into().unwrap()), 3);
    }
}

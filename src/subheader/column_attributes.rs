//! `ColumnAttributes` subheader: per-variable physical offset, length,
//! and type, split across subheaders to respect SAS's own size cap
//! (spec.md §4.E "ColumnAttributes").

use super::{write_variable_frame, LayoutView, Subheader, SIG_COLUMN_ATTRS, VARIABLE_FRAME_OVERHEAD};
use crate::bytes::{write_u16_le, write_u32_le, write_u64_le};
use crate::schema::VariableKind;

/// SAS's self-imposed cap on one `ColumnAttributes` subheader's payload
/// bytes.
pub const MAX_PAYLOAD_BYTES: usize = 24_588;
/// The smallest a `ColumnAttributes` subheader may be (frame plus the
/// leading reserved field, holding zero entries).
pub const MIN_SIZE: usize = 40;

const NAME_FLAG_SIMPLE: u16 = 0x0400;
const NAME_FLAG_LONG: u16 = 0x0800;
const NAME_FLAG_OTHER: u16 = 0x0C00;

/// Computes the name-flag byte pair for a variable name, per spec.md's
/// "simple identifier <= 8 chars" / "> 8 chars" / "otherwise" split.
#[must_use]
pub fn name_flag(name: &str, is_simple_identifier: bool) -> u16 {
    if !is_simple_identifier {
        return NAME_FLAG_OTHER;
    }
    if name.len() <= 8 {
        NAME_FLAG_SIMPLE
    } else {
        NAME_FLAG_LONG
    }
}

/// One variable's entry in a `ColumnAttributes` subheader.
#[derive(Debug, Clone, Copy)]
pub struct AttributeEntry {
    pub physical_offset: u64,
    pub column_length: u32,
    pub name_flag: u16,
    pub kind: VariableKind,
}

#[derive(Debug, Clone)]
pub struct ColumnAttributes {
    entries: Vec<AttributeEntry>,
}

impl ColumnAttributes {
    #[must_use]
    pub fn new(entries: Vec<AttributeEntry>) -> Self {
        Self { entries }
    }

    fn payload_len(&self) -> usize {
        8 + self.entries.len() * 16
    }
}

impl Subheader for ColumnAttributes {
    fn signature(&self) -> u64 {
        SIG_COLUMN_ATTRS
    }

    fn size(&self) -> usize {
        (self.payload_len() + VARIABLE_FRAME_OVERHEAD).max(MIN_SIZE)
    }

    fn write(&self, buf: &mut [u8], offset: usize, _view: &dyn LayoutView) {
        let payload_start = offset + 16;
        let payload_len = self.payload_len();
        let payload = &mut buf[payload_start..payload_start + payload_len];
        payload.fill(0);
        for (i, entry) in self.entries.iter().enumerate() {
            let entry_offset = 8 + i * 16;
            write_u64_le(payload, entry_offset, entry.physical_offset);
            write_u32_le(payload, entry_offset + 8, entry.column_length);
            write_u16_le(payload, entry_offset + 12, entry.name_flag);
            payload[entry_offset + 14] = match entry.kind {
                VariableKind::Numeric => 1,
                VariableKind::Character => 2,
            };
            payload[entry_offset + 15] = 0;
        }
        write_variable_frame(buf, offset, SIG_COLUMN_ATTRS, payload_len);
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
    fn name_flag_picks_correct_bucket() {
        assert_eq!(name_flag("SHORT", true), NAME_FLAG_SIMPLE);
        assert_eq!(name_flag("REALLYLONGNAME", true), NAME_FLAG_LONG);
        assert_eq!(name_flag("has space", false), NAME_FLAG_OTHER);
    }

    #[test]
    fn writes_one_entry() {
        let subheader = ColumnAttributes::new(vec![AttributeEntry {
            physical_offset: 0,
            column_length: 8,
            name_flag: NAME_FLAG_SIMPLE,
            kind: VariableKind::Numeric,
        }]);
        let mut buf = vec![0u8; subheader.size()];
        subheader.write(&mut buf, 0, &EmptyLayoutView);
        assert_eq!(u64::from_le_bytes(buf[24..32].try_into().unwrap()), 0);
        assert_eq!(u32::from_le_bytes(buf[32..36].try_into().unwrap()), 8);
        assert_eq!(buf[38], 1);
    }
}

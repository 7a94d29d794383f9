//! `RowSize` subheader: an 808-byte fixed record carrying totals computed
//! across the whole document (spec.md §4.E "RowSize").
//!
//! Because several fields depend on the final shape of the page layout
//! (counts, locations of other subheaders), `RowSize` is built last in the
//! pre-pass: every other subheader is created and placed first, and the
//! exporter resolves [`RowSizeFields`] only once those totals are known.

use std::cell::RefCell;
use std::rc::Rc;

use super::{LayoutView, Subheader, SIG_COLUMN_FORMAT, SIG_ROW_SIZE};
use crate::bytes::write_u64_le;

const SIZE: usize = 808;

/// A record location: a 1-based page number and 1-based position within
/// that page, or `(0, 0)`/`(0, 3)` for the documented empty-dataset
/// sentinels.
pub type RecordLocation = (u64, u32);

/// The totals `RowSize` needs, computed once the rest of the page layout
/// is final (spec.md §4.I "Exporter").
#[derive(Debug, Clone)]
pub struct RowSizeFields {
    pub row_length: u64,
    pub total_observations: u64,
    pub deleted_observations: u64,
    pub column_format_count_page_one: u64,
    pub column_format_count_page_two: u64,
    pub column_list_size_sum: u64,
    pub variable_name_bytes: u64,
    pub page_size: u64,
    pub max_obs_mixed: u64,
    pub initial_sequence: u32,
    pub column_size_location: RecordLocation,
    pub last_metadata_page_location: RecordLocation,
    pub first_data_record: RecordLocation,
    pub last_data_record: RecordLocation,
    pub label_ref: (u16, u16, u16),
    pub dataset_type_ref: (u16, u16, u16),
    pub column_text_subheader_count: u64,
    pub max_variable_name_len: u64,
    pub max_variable_label_len: u64,
    pub max_obs_per_data_page: u64,
}

impl RowSizeFields {
    /// An all-zero placeholder used while the rest of the page layout is
    /// still being built; replaced via [`RowSize::update`] once every
    /// total is known (spec.md §4.I).
    #[must_use]
    pub const fn placeholder() -> Self {
        Self {
            row_length: 0,
            total_observations: 0,
            deleted_observations: 0,
            column_format_count_page_one: 0,
            column_format_count_page_two: 0,
            column_list_size_sum: 0,
            variable_name_bytes: 0,
            page_size: 0,
            max_obs_mixed: 0,
            initial_sequence: 0,
            column_size_location: (0, 0),
            last_metadata_page_location: (0, 0),
            first_data_record: (0, 0),
            last_data_record: (0, 0),
            label_ref: (0, 0, 0),
            dataset_type_ref: (0, 0, 0),
            column_text_subheader_count: 0,
            max_variable_name_len: 0,
            max_variable_label_len: 0,
            max_obs_per_data_page: 0,
        }
    }
}

/// The `RowSize` record is added to the page layout before most of its own
/// content is known (spec.md §4.I: "its write sees the final state"), so
/// its fields live behind a `RefCell` the exporter fills in via
/// [`Self::update`] once every cross-page total has been computed.
#[derive(Debug, Clone)]
pub struct RowSize {
    fields: RefCell<RowSizeFields>,
}

impl RowSize {
    #[must_use]
    pub fn new(fields: RowSizeFields) -> Self {
        Self {
            fields: RefCell::new(fields),
        }
    }

    /// Replaces this record's fields, read back the next time the owning
    /// page is written.
    pub fn update(&self, fields: RowSizeFields) {
        *self.fields.borrow_mut() = fields;
    }
}

/// Lets a `RowSize` be shared between the exporter (which updates it once
/// totals are known) and the page layout (which owns it as a trait object)
/// without cloning its contents.
impl Subheader for Rc<RowSize> {
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

fn write_location(buf: &mut [u8], offset: usize, location: RecordLocation) {
    write_u64_le(buf, offset, location.0);
    crate::bytes::write_u32_le(buf, offset + 8, location.1);
}

fn write_text_ref(buf: &mut [u8], offset: usize, ref_triple: (u16, u16, u16)) {
    crate::bytes::write_u16_le(buf, offset, ref_triple.0);
    crate::bytes::write_u16_le(buf, offset + 2, ref_triple.1);
    crate::bytes::write_u16_le(buf, offset + 4, ref_triple.2);
}

impl Subheader for RowSize {
    fn signature(&self) -> u64 {
        SIG_ROW_SIZE
    }

    fn size(&self) -> usize {
        SIZE
    }

    fn write(&self, buf: &mut [u8], offset: usize, view: &dyn LayoutView) {
        let field = &mut buf[offset..offset + SIZE];
        field.fill(0);
        let f = self.fields.borrow();

        write_u64_le(field, 0, SIG_ROW_SIZE);
        write_u64_le(field, 40, f.row_length);
        write_u64_le(field, 48, f.total_observations);
        write_u64_le(field, 56, f.deleted_observations);
        write_u64_le(field, 72, f.column_format_count_page_one);
        write_u64_le(field, 80, f.column_format_count_page_two);
        write_u64_le(field, 88, f.column_list_size_sum);
        write_u64_le(field, 96, f.variable_name_bytes);
        write_u64_le(field, 104, f.page_size);
        write_u64_le(field, 120, f.max_obs_mixed);
        crate::bytes::write_u32_le(field, 440, f.initial_sequence);
        write_location(field, 512, f.column_size_location);
        write_location(field, 528, f.last_metadata_page_location);
        write_location(field, 544, f.first_data_record);
        write_location(field, 560, f.last_data_record);

        let first_column_format = view.first_location(SIG_COLUMN_FORMAT);
        write_location(
            field,
            576,
            (first_column_format.page, first_column_format.position),
        );

        write_text_ref(field, 678, f.label_ref);
        write_text_ref(field, 684, f.dataset_type_ref);
        // These three fields are 2 bytes wide, not 8: 750 and 752 are only
        // 2 bytes past their predecessor, so an 8-byte write here would
        // clobber the next field's leading bytes.
        crate::bytes::write_u16_le(field, 748, f.column_text_subheader_count as u16);
        crate::bytes::write_u16_le(field, 750, f.max_variable_name_len as u16);
        crate::bytes::write_u16_le(field, 752, f.max_variable_label_len as u16);
        write_u64_le(field, 766, f.max_obs_per_data_page);
        write_u64_le(field, 776, f.total_observations);
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

    fn sample_fields() -> RowSizeFields {
        RowSizeFields {
            row_length: 16,
            total_observations: 3,
            deleted_observations: 0,
            column_format_count_page_one: 1,
            column_format_count_page_two: 0,
            column_list_size_sum: 0,
            variable_name_bytes: 4,
            page_size: 65_536,
            max_obs_mixed: 100,
            initial_sequence: 0xF4A4_F0F6,
            column_size_location: (1, 2),
            last_metadata_page_location: (1, 5),
            first_data_record: (1, 6),
            last_data_record: (1, 6),
            label_ref: (0, 0, 0),
            dataset_type_ref: (0, 8, 8),
            column_text_subheader_count: 1,
            max_variable_name_len: 2,
            max_variable_label_len: 0,
            max_obs_per_data_page: 4000,
        }
    }

    #[test]
    fn writes_signature_and_row_length() {
        let row_size = RowSize::new(sample_fields());
        let mut buf = vec![0u8; SIZE];
        row_size.write(&mut buf, 0, &EmptyLayoutView);
        assert_eq!(u64::from_le_bytes(buf[0..8].try_into().unwrap()), SIG_ROW_SIZE);
        assert_eq!(u64::from_le_bytes(buf[40..48].try_into().unwrap()), 16);
        assert_eq!(u64::from_le_bytes(buf[48..56].try_into().unwrap()), 3);
        assert_eq!(u64::from_le_bytes(buf[120..128].try_into().unwrap()), 100);
    }

    #[test]
    fn narrow_fields_near_offset_750_do_not_overlap() {
        let mut fields = sample_fields();
        fields.column_text_subheader_count = 1;
        fields.max_variable_name_len = 7;
        fields.max_variable_label_len = 40;
        fields.max_obs_per_data_page = 4000;
        fields.total_observations = 3;
        let row_size = RowSize::new(fields);
        let mut buf = vec![0u8; SIZE];
        row_size.write(&mut buf, 0, &EmptyLayoutView);

        assert_eq!(u16::from_le_bytes(buf[748..750].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(buf[750..752].try_into().unwrap()), 7);
        assert_eq!(u16::from_le_bytes(buf[752..754].try_into().unwrap()), 40);
        assert_eq!(u64::from_le_bytes(buf[766..774].try_into().unwrap()), 4000);
        assert_eq!(u64::from_le_bytes(buf[776..784].try_into().unwrap()), 3);
    }
}

//! The streaming exporter (spec.md §4.I "Exporter").
//!
//! `Exporter::new` performs the entire metadata pre-pass described in
//! §4.H/§4.I up front: it builds the variable layout, interns every
//! string, places every subheader, and resolves every cross-reference it
//! can before a single byte reaches the output stream. `write_row`/`close`
//! then only ever touch the row region of whichever page is currently
//! open.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use crate::error::{Error, ExportStage, Result};
use crate::header::{write_header, HeaderFields, HEADER_LENGTH_FIELD};
use crate::layout::VariableLayout;
use crate::page::{page_size_for, Page};
use crate::page_layout::PageLayout;
use crate::row::{encode_row, fill_row_padding};
use crate::schema::Schema;
use crate::sequence::PageSequencer;
use crate::subheader::{
    name_flag, AttributeEntry, ColumnAttributes, ColumnFormat, ColumnFormatTextRef, ColumnList,
    ColumnName, ColumnSize, NameEntry, RowSize, RowSizeFields, Subheader, SubheaderCounts,
    COLUMN_ATTRS_MAX_PAYLOAD_BYTES, COLUMN_LIST_MAX_ENTRIES, COLUMN_NAME_MAX_ENTRIES, SIG_COLUMN_FORMAT,
    VARIABLE_FRAME_OVERHEAD,
};
use crate::text_pool::{TextPool, TextReference};
use crate::value::Value;

/// A frozen, read-only copy of a finished [`PageLayout`]'s subheader
/// index, kept alive after the `PageLayout` itself has been consumed by
/// [`Exporter::new`] — any page written later (including the retained
/// "current" page, possibly long after construction) still needs to
/// resolve `RowSize`/`SubheaderCounts` cross-references against the whole
/// document.
struct FrozenLayoutView(Vec<(crate::subheader::Location, u64)>);

impl crate::subheader::LayoutView for FrozenLayoutView {
    fn for_each_subheader(&self, visitor: &mut dyn FnMut(crate::subheader::Location, u64)) {
        for &(location, signature) in &self.0 {
            visitor(location, signature);
        }
    }
}

/// A reasonably-simple-looking identifier: letters/underscore first, then
/// letters/digits/underscore, all ASCII — used only to pick the
/// `ColumnAttributes` name-flag bucket (spec.md §4.E).
fn looks_like_simple_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.clone().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.is_ascii()
}

fn text_ref_to_format(r: TextReference) -> ColumnFormatTextRef {
    ColumnFormatTextRef {
        subheader_index: r.subheader_index,
        offset_from_signature: r.offset_from_signature,
        length: r.length,
    }
}

fn text_ref_to_name_entry(r: TextReference) -> NameEntry {
    NameEntry {
        text_subheader_index: r.subheader_index,
        offset_from_signature: r.offset_from_signature,
        length: r.length,
    }
}

fn text_ref_triple(r: TextReference) -> (u16, u16, u16) {
    (r.subheader_index, r.offset_from_signature, r.length)
}

/// Per-variable text-pool references collected during the interning pass,
/// carried through to building `ColumnName`/`ColumnAttributes`/
/// `ColumnFormat`.
struct VariableRefs {
    name: TextReference,
    label: TextReference,
    input_format_name: TextReference,
    output_format_name: TextReference,
}

/// Streaming SAS7BDAT writer: exactly `total_rows` calls to
/// [`Self::write_row`], then [`Self::close`] (spec.md §4.I, §6).
pub struct Exporter {
    file: File,
    schema: Schema,
    layout: VariableLayout,
    page_size: usize,
    view: Rc<FrozenLayoutView>,
    sequencer: PageSequencer,
    current_page: Page,
    current_page_sequence: u32,
    row_buf: Vec<u8>,
    rows_written: u64,
    total_rows: u64,
    closed: bool,
}

impl Exporter {
    /// Opens `path` and performs the full metadata pre-pass described in
    /// spec.md §4.I: builds the variable layout, interns every string,
    /// places every subheader, writes the file header and every finalised
    /// metadata page, and retains the final ("mixed") metadata page as
    /// the open page `write_row` appends to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the destination cannot be created or
    /// written. Returns [`Error::Invariant`] if the metadata pre-pass
    /// violates one of the engine's own internal accounting assumptions
    /// (a defect, not a caller error).
    pub fn new(path: impl AsRef<Path>, schema: Schema, total_rows: u64) -> Result<Self> {
        let layout = VariableLayout::new(&schema);
        let row_length = layout.row_length();
        let page_size = page_size_for(row_length);
        let file = File::create(path)?;

        let mut page_layout = PageLayout::new(page_size, row_length);

        let row_size = Rc::new(RowSize::new(RowSizeFields::placeholder()));
        page_layout.add_subheader(Box::new(Rc::clone(&row_size)))?;

        page_layout.add_subheader(Box::new(ColumnSize::new(schema.variable_count() as u64)))?;

        let subheader_counts = Rc::new(SubheaderCounts::new(0));
        page_layout.add_subheader(Box::new(Rc::clone(&subheader_counts)))?;

        let mut max_variable_payload = 0u64;
        let mut text_pool = TextPool::new(true);

        macro_rules! intern {
            ($s:expr) => {{
                let reference = text_pool.add($s, || page_layout.remaining_text_bytes());
                for chunk in text_pool.drain_committed() {
                    max_variable_payload = max_variable_payload.max((chunk.size() - VARIABLE_FRAME_OVERHEAD) as u64);
                    page_layout.add_subheader(Box::new(chunk))?;
                }
                reference
            }};
        }

        intern!("\0\0\0\0");
        intern!("        ");
        let dataset_type_padded = format!("{:<8}", schema.dataset_type());
        let dataset_type_ref = intern!(dataset_type_padded.as_str());
        intern!("DATASTEP");
        let label_ref = intern!(schema.label());

        let mut variable_refs = Vec::with_capacity(schema.variable_count());
        for variable in schema.variables() {
            let name = intern!(variable.name());
            let label = intern!(variable.label());
            let input_format_name = intern!(variable.input_format().name());
            let output_format_name = intern!(variable.output_format().name());
            variable_refs.push(VariableRefs {
                name,
                label,
                input_format_name,
                output_format_name,
            });
        }

        text_pool.finalise();
        let mut column_text_subheader_count = 0u64;
        for chunk in text_pool.drain_committed() {
            max_variable_payload = max_variable_payload.max((chunk.size() - VARIABLE_FRAME_OVERHEAD) as u64);
            page_layout.add_subheader(Box::new(chunk))?;
            column_text_subheader_count += 1;
        }

        for chunk in variable_refs.chunks(COLUMN_NAME_MAX_ENTRIES) {
            let entries: Vec<NameEntry> = chunk.iter().map(|r| text_ref_to_name_entry(r.name)).collect();
            let subheader = ColumnName::new(entries);
            max_variable_payload = max_variable_payload.max((subheader.size() - VARIABLE_FRAME_OVERHEAD) as u64);
            page_layout.add_subheader(Box::new(subheader))?;
        }

        let max_attrs_entries = (COLUMN_ATTRS_MAX_PAYLOAD_BYTES - 8) / 16;
        let variables: Vec<_> = schema.variables().iter().collect();
        for (chunk_index, chunk) in variables.chunks(max_attrs_entries).enumerate() {
            let base = chunk_index * max_attrs_entries;
            let entries: Vec<AttributeEntry> = chunk
                .iter()
                .enumerate()
                .map(|(offset, variable)| {
                    let i = base + offset;
                    AttributeEntry {
                        physical_offset: layout.physical_offset(i) as u64,
                        column_length: u32::from(variable.length()),
                        name_flag: name_flag(variable.name(), looks_like_simple_identifier(variable.name())),
                        kind: variable.kind(),
                    }
                })
                .collect();
            let subheader = ColumnAttributes::new(entries);
            max_variable_payload = max_variable_payload.max((subheader.size() - VARIABLE_FRAME_OVERHEAD) as u64);
            page_layout.add_subheader(Box::new(subheader))?;
        }

        let mut column_list_size_sum = 0u64;
        if schema.variable_count() > 1 {
            let total_variables = schema.variable_count() as u16;
            let all_entries: Vec<u16> = (1..=total_variables).collect();
            for chunk in all_entries.chunks(COLUMN_LIST_MAX_ENTRIES) {
                let subheader = ColumnList::new(chunk.to_vec(), total_variables);
                column_list_size_sum += (subheader.size() - VARIABLE_FRAME_OVERHEAD) as u64;
                max_variable_payload = max_variable_payload.max((subheader.size() - VARIABLE_FRAME_OVERHEAD) as u64);
                page_layout.add_subheader(Box::new(subheader))?;
            }
        }

        for (variable, refs) in schema.variables().iter().zip(&variable_refs) {
            let output_format = variable.output_format();
            let input_format = variable.input_format();
            let subheader = ColumnFormat {
                output_width: output_format.width(),
                output_decimals: output_format.decimals(),
                input_width: input_format.width(),
                input_decimals: input_format.decimals(),
                input_format_name: text_ref_to_format(refs.input_format_name),
                output_format_name: text_ref_to_format(refs.output_format_name),
                label: text_ref_to_format(refs.label),
            };
            page_layout.add_subheader(Box::new(subheader))?;
        }

        subheader_counts.update_max_payload_size(max_variable_payload);

        page_layout.finalise_current();

        let max_obs_mixed = page_layout.current_page().max_observations() as u64;
        let max_obs_data = (8 * (page_size - 40) / (8 * row_length + 1)) as u64;
        let total_meta_pages = page_layout.total_metadata_pages();

        let total_data_pages = if total_rows <= max_obs_mixed {
            0
        } else {
            let remaining = total_rows - max_obs_mixed;
            remaining.div_ceil(max_obs_data)
        };
        // The header occupies its own fixed-size prologue block, separate from
        // every page written after it, but SAS still counts it as one of the
        // file's "pages" in this field — one more than the metadata+data page
        // count that every other cross-reference (RowSize's own location
        // fields) uses.
        let total_pages = total_meta_pages + total_data_pages + 1;

        let subheaders_on_mixed_page = page_layout.current_page().subheader_count() as u64;
        let (first_data_record, last_data_record) = data_record_locations(
            total_rows,
            max_obs_mixed,
            max_obs_data,
            total_meta_pages,
            subheaders_on_mixed_page,
        );

        let (column_format_count_page_one, column_format_count_page_two) =
            column_format_counts_by_page(&page_layout);

        let variable_name_bytes = schema.variables().iter().map(|v| v.name().len() as u64).sum();
        let max_variable_name_len = schema.variables().iter().map(|v| v.name().len() as u64).max().unwrap_or(0);
        let max_variable_label_len = schema.variables().iter().map(|v| v.label().len() as u64).max().unwrap_or(0);

        row_size.update(RowSizeFields {
            row_length: row_length as u64,
            total_observations: total_rows,
            deleted_observations: 0,
            column_format_count_page_one,
            column_format_count_page_two,
            column_list_size_sum,
            variable_name_bytes,
            page_size: page_size as u64,
            max_obs_mixed,
            initial_sequence: PageSequencer::initial(),
            column_size_location: (1, 2),
            last_metadata_page_location: (total_meta_pages, subheaders_on_mixed_page.saturating_sub(1) as u32),
            first_data_record,
            last_data_record,
            label_ref: text_ref_triple(label_ref),
            dataset_type_ref: text_ref_triple(dataset_type_ref),
            column_text_subheader_count,
            max_variable_name_len,
            max_variable_label_len,
            max_obs_per_data_page: max_obs_data,
        });

        let snapshot = {
            use crate::subheader::LayoutView as _;
            let mut entries = Vec::new();
            page_layout.for_each_subheader(&mut |location, signature| entries.push((location, signature)));
            FrozenLayoutView(entries)
        };
        let view = Rc::new(snapshot);

        let mut file = file;
        let mut sequencer = PageSequencer::new();

        let mut header_buf = vec![0u8; HEADER_LENGTH_FIELD as usize];
        write_header(
            &mut header_buf,
            &HeaderFields {
                dataset_name: schema.name(),
                created: schema.created(),
                page_size: page_size as u64,
                total_pages,
                initial_sequence: PageSequencer::initial(),
            },
        )?;
        file.write_all(&header_buf)?;

        for page in page_layout.finalised_pages() {
            let mut buf = vec![0u8; page_size];
            page.write(&mut buf, sequencer.current(), view.as_ref());
            file.write_all(&buf)?;
            sequencer.advance()?;
        }
        let current_page_sequence = sequencer.current();
        let current_page = page_layout.into_current_page();

        Ok(Self {
            file,
            schema,
            layout,
            page_size,
            view,
            sequencer,
            current_page,
            current_page_sequence,
            row_buf: vec![0u8; row_length],
            rows_written: 0,
            total_rows,
            closed: false,
        })
    }

    /// Encodes and appends one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExporterClosed`] if [`Self::close`] was already
    /// called, or [`Error::TooManyRows`] if `total_rows` rows have already
    /// been written. Propagates [`Error::Arity`], [`Error::Type`], and
    /// [`Error::Truncation`] from [`encode_row`].
    #[cfg_attr(feature = "hotpath", hotpath::measure)]
    pub fn write_row(&mut self, row: &[Value<'_>]) -> Result<()> {
        if self.closed {
            return Err(Error::ExporterClosed);
        }
        if self.rows_written >= self.total_rows {
            return Err(Error::TooManyRows { declared: self.total_rows });
        }

        fill_row_padding(&mut self.row_buf);
        encode_row(&mut self.row_buf, 0, &self.schema, &self.layout, self.rows_written, row)?;

        if self.current_page.add_row(self.row_buf.clone()).is_err() {
            self.flush_current_page()?;
            self.open_fresh_data_page()?;
            self.current_page.add_row(self.row_buf.clone()).map_err(|_| {
                Error::invariant(
                    ExportStage::Row {
                        index: self.rows_written,
                    },
                    "encoded row does not fit even on a freshly opened data page",
                )
            })?;
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Whether every declared row has been written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rows_written >= self.total_rows
    }

    /// Flushes the current page and closes the output stream. Idempotent.
    /// Does not error if fewer than `total_rows` rows were written — a
    /// declared limitation (spec.md §9) rather than a caller mistake.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the final page cannot be written.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush_current_page()?;
        self.closed = true;
        if self.rows_written < self.total_rows {
            crate::logger::log_warn(&format!(
                "exporter closed after {} of {} declared rows",
                self.rows_written, self.total_rows
            ));
        }
        Ok(())
    }

    fn flush_current_page(&mut self) -> Result<()> {
        let mut buf = vec![0u8; self.page_size];
        self.current_page.write(&mut buf, self.current_page_sequence, self.view.as_ref());
        self.file.write_all(&buf)?;
        Ok(())
    }

    fn open_fresh_data_page(&mut self) -> Result<()> {
        self.sequencer.advance()?;
        self.current_page_sequence = self.sequencer.current();
        let mut page = Page::new(self.page_size, self.layout.row_length());
        page.finalise();
        self.current_page = page;
        Ok(())
    }
}

/// Groups every `ColumnFormat` subheader's location by page, returning the
/// counts on the first and second distinct pages encountered in page
/// order (spec.md §4.I, `RowSize` offsets 72/80).
fn column_format_counts_by_page(page_layout: &PageLayout) -> (u64, u64) {
    use crate::subheader::LayoutView as _;

    let mut pages: Vec<u64> = Vec::new();
    let mut counts: std::collections::HashMap<u64, u64> = std::collections::HashMap::new();
    page_layout.for_each_subheader(&mut |location, signature| {
        if signature == SIG_COLUMN_FORMAT {
            *counts.entry(location.page).or_insert(0) += 1;
            if !pages.contains(&location.page) {
                pages.push(location.page);
            }
        }
    });
    pages.sort_unstable();
    let first = pages.first().map(|p| counts[p]).unwrap_or(0);
    let second = pages.get(1).map(|p| counts[p]).unwrap_or(0);
    (first, second)
}

/// Resolves `RowSize`'s first/last data-record locations (spec.md §4.I,
/// offsets 544/560): a dataset with no rows writes the documented `(0, 3)`
/// sentinel for both; otherwise the first row lands on the mixed page
/// (right after its subheaders) unless no rows fit there at all, and the
/// last row lands wherever the row count run out, spilling onto however
/// many subsequent pure-data pages are needed.
fn data_record_locations(
    total_rows: u64,
    max_obs_mixed: u64,
    max_obs_data: u64,
    mixed_page_number: u64,
    subheaders_on_mixed_page: u64,
) -> ((u64, u32), (u64, u32)) {
    if total_rows == 0 {
        return ((0, 3), (0, 3));
    }

    if max_obs_mixed == 0 {
        let first = (mixed_page_number + 1, 1u32);
        let last_page_index = (total_rows - 1) / max_obs_data;
        let rows_before_last_page = last_page_index * max_obs_data;
        let rows_on_last_page = (total_rows - rows_before_last_page) as u32;
        let last = (mixed_page_number + 1 + last_page_index, rows_on_last_page);
        return (first, last);
    }

    let first = (mixed_page_number, subheaders_on_mixed_page as u32 + 1);
    let observations_on_mixed_page = total_rows.min(max_obs_mixed);
    let remaining = total_rows - observations_on_mixed_page;
    let last = if remaining == 0 {
        (
            mixed_page_number,
            (subheaders_on_mixed_page + observations_on_mixed_page) as u32,
        )
    } else {
        let last_page_index = (remaining - 1) / max_obs_data;
        let rows_before_last_page = last_page_index * max_obs_data;
        let rows_on_last_page = (remaining - rows_before_last_page) as u32;
        (mixed_page_number + 1 + last_page_index, rows_on_last_page)
    };
    (first, last)
}

/// One-shot export of a finite row list (spec.md §4.I, §6).
///
/// # Errors
///
/// Propagates every error [`Exporter::new`], [`Exporter::write_row`], and
/// [`Exporter::close`] can return.
pub fn export_dataset(path: impl AsRef<Path>, schema: Schema, rows: &[Vec<Value<'_>>]) -> Result<()> {
    let mut exporter = Exporter::new(path, schema, rows.len() as u64)?;
    for row in rows {
        exporter.write_row(row)?;
    }
    exporter.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Format, Strictness, Variable, VariableKind};

    fn simple_schema() -> Schema {
        Schema::builder()
            .name("T")
            .variable(
                Variable::new(
                    "N",
                    VariableKind::Numeric,
                    8,
                    "",
                    Format::unspecified(),
                    Format::unspecified(),
                    Strictness::Any,
                )
                .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn data_record_locations_empty_dataset_is_sentinel() {
        let (first, last) = data_record_locations(0, 0, 10, 1, 3);
        assert_eq!(first, (0, 3));
        assert_eq!(last, (0, 3));
    }

    #[test]
    fn data_record_locations_fit_entirely_on_mixed_page() {
        let (first, last) = data_record_locations(2, 10, 10, 1, 3);
        assert_eq!(first, (1, 4));
        assert_eq!(last, (1, 5));
    }

    #[test]
    fn export_dataset_round_trips_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sas7bdat");
        let schema = simple_schema();
        let rows = vec![vec![Value::from(1.0)], vec![Value::from(2.0)]];
        export_dataset(&path, schema, &rows).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() >= 0x1_0000, "file must be at least one page long");
    }

    #[test]
    fn write_row_rejects_extra_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sas7bdat");
        let mut exporter = Exporter::new(&path, simple_schema(), 1).unwrap();
        exporter.write_row(&[Value::from(1.0)]).unwrap();
        assert!(exporter.is_complete());
        let err = exporter.write_row(&[Value::from(2.0)]).unwrap_err();
        assert!(matches!(err, Error::TooManyRows { declared: 1 }));
        exporter.close().unwrap();
    }

    #[test]
    fn close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sas7bdat");
        let mut exporter = Exporter::new(&path, simple_schema(), 1).unwrap();
        exporter.write_row(&[Value::from(1.0)]).unwrap();
        exporter.close().unwrap();
        exporter.close().unwrap();
    }

    #[test]
    fn operations_after_close_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sas7bdat");
        let mut exporter = Exporter::new(&path, simple_schema(), 1).unwrap();
        exporter.close().unwrap();
        let err = exporter.write_row(&[Value::from(1.0)]).unwrap_err();
        assert!(matches!(err, Error::ExporterClosed));
    }
}

//! The subheader family: fixed- and variable-size metadata records packed
//! into pages (spec.md §4.E "Subheader family").
//!
//! Every subheader is created as a placeholder during exporter
//! construction and later asked to `write` itself once the page layout has
//! resolved every cross-reference (spec.md §9, "Lazy cross-referencing
//! subheaders"). A subheader never owns the layout; it borrows a
//! [`LayoutView`] only for the duration of `write`.

mod column_attributes;
mod column_format;
mod column_list;
mod column_name;
mod column_size;
mod column_text;
mod row_size;
mod subheader_counts;
mod terminal;

pub use column_attributes::{name_flag, AttributeEntry, ColumnAttributes};
pub use column_format::{ColumnFormat, TextRef as ColumnFormatTextRef};
pub use column_list::ColumnList;
pub use column_name::{ColumnName, NameEntry};
pub use column_size::ColumnSize;
pub use column_text::ColumnText;
pub use row_size::{RowSize, RowSizeFields};
pub use subheader_counts::SubheaderCounts;
pub use terminal::Terminal;

pub use column_attributes::MAX_PAYLOAD_BYTES as COLUMN_ATTRS_MAX_PAYLOAD_BYTES;
pub use column_list::MAX_ENTRIES as COLUMN_LIST_MAX_ENTRIES;
pub use column_name::MAX_ENTRIES as COLUMN_NAME_MAX_ENTRIES;

/// Location of a subheader in emission order: 1-based page number and
/// 1-based position within that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub page: u64,
    pub position: u32,
}

impl Location {
    #[must_use]
    pub const fn absent() -> Self {
        Self { page: 0, position: 0 }
    }

    #[must_use]
    pub const fn is_present(self) -> bool {
        self.position != 0
    }
}

/// A read-only snapshot of the committed subheader list, queried by
/// subheaders whose contents depend on aggregate/global state (RowSize,
/// SubheaderCounts) — spec.md §9, "the `layout_view` is a read-only
/// snapshot exposing `for_each_subheader` and kind-tagged queries."
pub trait LayoutView {
    /// Invokes `visitor` once per committed subheader, in emission order,
    /// with its 1-based `(page_number, position_in_page)` and signature.
    fn for_each_subheader(&self, visitor: &mut dyn FnMut(Location, u64));

    /// The location of the first subheader carrying `signature`, or
    /// [`Location::absent`] if none was emitted.
    fn first_location(&self, signature: u64) -> Location {
        let mut found = Location::absent();
        self.for_each_subheader(&mut |loc, sig| {
            if sig == signature && !found.is_present() {
                found = loc;
            }
        });
        found
    }

    /// The location of the last subheader carrying `signature`.
    fn last_location(&self, signature: u64) -> Location {
        let mut found = Location::absent();
        self.for_each_subheader(&mut |loc, sig| {
            if sig == signature {
                found = loc;
            }
        });
        found
    }
}

/// Common behaviour of every subheader kind.
pub trait Subheader {
    /// The 8-byte signature identifying this subheader's kind. Fixed-size
    /// subheaders use a 32-bit value stored in the low word; the crate
    /// treats all signatures as `u64` for uniformity.
    fn signature(&self) -> u64;

    /// The number of bytes this subheader occupies on the page, frame
    /// included for variable-size kinds.
    fn size(&self) -> usize;

    /// Writes this subheader's bytes into `buf` at `offset`, using `view`
    /// to resolve any cross-references.
    fn write(&self, buf: &mut [u8], offset: usize, view: &dyn LayoutView);

    /// `0` for an "A" (fixed-size) subheader, `1` for a "B" (variable-size)
    /// subheader.
    fn type_code(&self) -> u8;

    /// `0` for uncompressed, `1` for deleted/terminal.
    fn compression_code(&self) -> u8;
}

/// `ROW_SIZE` subheader signature.
pub const SIG_ROW_SIZE: u64 = 0xF7F7_F7F7;
/// `COLUMN_SIZE` subheader signature.
pub const SIG_COLUMN_SIZE: u64 = 0xF6F6_F6F6;
/// `SUBHEADER_COUNTS` subheader signature.
pub const SIG_SUBHEADER_COUNTS: u64 = 0xFFFF_FFFF_FFFF_FC00;
/// `COLUMN_FORMAT` subheader signature.
pub const SIG_COLUMN_FORMAT: u64 = 0xFFFF_FFFF_FFFF_FBFE;
/// `COLUMN_ATTRS` subheader signature.
pub const SIG_COLUMN_ATTRS: u64 = 0xFFFF_FFFF_FFFF_FFFC;
/// `COLUMN_TEXT` subheader signature.
pub const SIG_COLUMN_TEXT: u64 = 0xFFFF_FFFF_FFFF_FFFD;
/// `COLUMN_LIST` subheader signature.
pub const SIG_COLUMN_LIST: u64 = 0xFFFF_FFFF_FFFF_FFFE;
/// `COLUMN_NAME` subheader signature.
pub const SIG_COLUMN_NAME: u64 = 0xFFFF_FFFF_FFFF_FFFF;
/// Three tracked-but-unused signatures carried for `SubheaderCounts`
/// parity with SAS's own output.
pub const SIG_UNKNOWN_FB: u64 = 0xFFFF_FFFF_FFFF_FFFB;
pub const SIG_UNKNOWN_FA: u64 = 0xFFFF_FFFF_FFFF_FFFA;
pub const SIG_UNKNOWN_F9: u64 = 0xFFFF_FFFF_FFFF_FFF9;

/// The 12-byte all-zero footer shared by every variable-size subheader.
pub const VARIABLE_FOOTER_LEN: usize = 12;
/// Total frame overhead (8B signature + 8B payload-size + 12B footer) for
/// a variable-size subheader.
pub const VARIABLE_FRAME_OVERHEAD: usize = 28;

/// Writes the shared variable-size subheader frame (signature, payload
/// size, and zero footer) around `payload`, which the caller has already
/// written into `buf[offset+16..offset+16+payload_len]`.
pub(crate) fn write_variable_frame(
    buf: &mut [u8],
    offset: usize,
    signature: u64,
    payload_len: usize,
) {
    crate::bytes::write_u64_le(buf, offset, signature);
    crate::bytes::write_u64_le(buf, offset + 8, payload_len as u64);
    let footer_start = offset + 16 + payload_len;
    buf[footer_start..footer_start + VARIABLE_FOOTER_LEN].fill(0);
}

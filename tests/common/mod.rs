//! Byte-level helpers shared by the black-box integration tests: parse
//! only the fields this crate itself promises to write, walking pages the
//! same way a SAS7BDAT reader would (mirroring the layout documented in
//! `src/page.rs` and `src/header.rs`).

use std::fs;
use std::path::Path;

use sas7bdat_export::subheader::SIG_ROW_SIZE;

pub const HEADER_LEN: usize = 1024;
const PAGE_HEADER_LEN: usize = 40;
const INDEX_ENTRY_LEN: usize = 24;

pub struct ParsedFile {
    pub header: Vec<u8>,
    pub pages: Vec<Vec<u8>>,
}

#[must_use]
pub fn read_file(path: &Path, page_size: usize) -> ParsedFile {
    let bytes = fs::read(path).expect("export wrote a file");
    assert!(bytes.len() >= HEADER_LEN, "file shorter than the header block");
    let header = bytes[..HEADER_LEN].to_vec();
    let rest = &bytes[HEADER_LEN..];
    assert_eq!(rest.len() % page_size, 0, "file body is not a whole number of pages");
    let pages = rest.chunks(page_size).map(<[u8]>::to_vec).collect();
    ParsedFile { header, pages }
}

#[must_use]
pub fn u16_le(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(buf[off..off + 2].try_into().unwrap())
}

#[must_use]
pub fn u32_le(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(buf[off..off + 4].try_into().unwrap())
}

#[must_use]
pub fn u64_le(buf: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(buf[off..off + 8].try_into().unwrap())
}

pub struct SubheaderEntry {
    pub body_offset: usize,
    pub body_length: usize,
}

/// Walks one page's subheader index (the `subheader_count` entries starting
/// at offset 40), returning each entry's body offset/length.
#[must_use]
pub fn subheader_index(page: &[u8]) -> Vec<SubheaderEntry> {
    let subheader_count = usize::from(u16_le(page, 36));
    let mut entries = Vec::with_capacity(subheader_count);
    let mut offset = PAGE_HEADER_LEN;
    for _ in 0..subheader_count {
        entries.push(SubheaderEntry {
            body_offset: u64_le(page, offset) as usize,
            body_length: u64_le(page, offset + 8) as usize,
        });
        offset += INDEX_ENTRY_LEN;
    }
    entries
}

/// The 8-byte signature at the front of a subheader's body, or 0 for a
/// zero-length (Terminal) entry.
#[must_use]
pub fn signature_at(page: &[u8], entry: &SubheaderEntry) -> u64 {
    if entry.body_length == 0 {
        0
    } else {
        u64_le(page, entry.body_offset)
    }
}

/// Counts subheaders on `page` carrying `signature`.
#[must_use]
pub fn count_signature(page: &[u8], signature: u64) -> usize {
    subheader_index(page)
        .iter()
        .filter(|entry| signature_at(page, entry) == signature)
        .count()
}

/// Byte offset where row data begins on a page: right after its subheader
/// index (spec.md §4.G: `index_cursor` after every subheader is added).
#[must_use]
pub fn row_region_offset(page: &[u8]) -> usize {
    let subheader_count = usize::from(u16_le(page, 36));
    PAGE_HEADER_LEN + INDEX_ENTRY_LEN * subheader_count
}

/// Finds the body offset of the page's `RowSize` subheader (always the
/// first subheader on the first metadata page, spec.md §3 invariants).
#[must_use]
pub fn row_size_body_offset(first_page: &[u8]) -> usize {
    subheader_index(first_page)
        .into_iter()
        .find(|entry| signature_at(first_page, entry) == SIG_ROW_SIZE)
        .expect("first metadata page always carries a RowSize subheader")
        .body_offset
}

/// Reads a `(page: u64, position: u32)` record location out of a `RowSize`
/// body at the given field offset (spec.md §4.E "RowSize").
#[must_use]
pub fn read_location(row_size_body: &[u8], field_offset: usize) -> (u64, u32) {
    (u64_le(row_size_body, field_offset), u32_le(row_size_body, field_offset + 8))
}

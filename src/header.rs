//! The file header record (spec.md §4.J "Header record").
//!
//! The header occupies its own fixed [`HEADER_LENGTH_FIELD`]-byte block at
//! the front of the file, written before any page; it is not overlaid onto
//! page 1's buffer, which keeps this module's offsets and
//! [`crate::page::Page::write`]'s own page-header offsets from colliding.

use time::OffsetDateTime;

use crate::bytes::{write_ascii, write_f64_le, write_u32_le, write_u64_le, write_utf8};
use crate::datetime::datetime_to_sas;
use crate::error::Result;

/// Value written at offset 200 ("header length"): SAS's own minimum,
/// also used by readers as the start of the first metadata page.
pub const HEADER_LENGTH_FIELD: u32 = 1024;

const MAGIC_NUMBER: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC2, 0xEA, 0x81, 0x60,
    0xB3, 0x14, 0x11, 0xCF, 0xBD, 0x92, 0x08, 0x00, 0x09, 0xC7, 0x31, 0x8C, 0x18, 0x1F, 0x10, 0x11,
];

const ALIGNMENT_MARK_64BIT: u8 = 0x33;
const ENDIAN_LITTLE: u8 = 0x01;
const HOST_UNIX: u8 = 0x01;
const ENCODING_UTF8: u8 = 20;

const SAS_VERSION: &str = "9.0401M2";
const SERVER_TYPE: &str = "Linux";
const OS_NAME: &str = "x86_64";
/// Stand-in for the kernel release string real SAS reads from `uname`;
/// fixed rather than probed so output is reproducible across hosts.
const OS_RELEASE: &str = "5.10.0";

/// A pair of hard-coded password-related pattern words SAS always writes
/// in an unencrypted file; not derived from the creation time here.
const PASSWORD_PATTERN: [u8; 2] = [0x00, 0x00];

/// Arguments needed to render the file header.
#[derive(Debug, Clone)]
pub struct HeaderFields<'a> {
    pub dataset_name: &'a str,
    pub created: OffsetDateTime,
    pub page_size: u64,
    pub total_pages: u64,
    pub initial_sequence: u32,
}

/// Writes the file header record into the front of `buf`, the
/// [`HEADER_LENGTH_FIELD`]-byte header block.
///
/// # Panics
///
/// Panics if `buf` is shorter than 336 bytes, which cannot happen for a
/// buffer of [`HEADER_LENGTH_FIELD`] bytes.
///
/// # Errors
///
/// Returns an error if `fields.created`'s SAS-epoch conversion fails
/// (see [`crate::datetime::datetime_to_sas`]).
pub fn write_header(buf: &mut [u8], fields: &HeaderFields<'_>) -> Result<()> {
    assert!(buf.len() >= 336, "page buffer too small to hold the file header");

    buf[..32].copy_from_slice(&MAGIC_NUMBER);
    buf[32] = ALIGNMENT_MARK_64BIT;
    buf[36] = ENDIAN_LITTLE;
    buf[37] = HOST_UNIX;
    buf[56] = ENCODING_UTF8;

    write_ascii(buf, 84, "SAS FILE", 8);
    write_utf8(buf, 92, fields.dataset_name, 64, b' ');
    write_ascii(buf, 156, "DATA", 8);

    let created_seconds = datetime_to_sas(fields.created)?;
    write_f64_le(buf, 164, created_seconds);
    write_f64_le(buf, 172, created_seconds);
    write_f64_le(buf, 328, created_seconds);

    write_u32_le(buf, 200, HEADER_LENGTH_FIELD);
    write_u32_le(buf, 204, fields.page_size as u32);
    write_u64_le(buf, 208, fields.total_pages);
    write_ascii(buf, 216, SAS_VERSION, 16);
    write_ascii(buf, 232, SERVER_TYPE, 16);
    write_ascii(buf, 248, OS_RELEASE, 16);
    write_ascii(buf, 264, OS_NAME, 16);

    buf[280] = PASSWORD_PATTERN[0];
    buf[281] = PASSWORD_PATTERN[1];

    write_u32_le(buf, 320, fields.initial_sequence);
    Ok(())
}

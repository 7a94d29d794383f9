//! The column text pool: strings interned into `ColumnText` subheaders,
//! chunked to respect a byte cap and the remaining space on the current
//! metadata page (spec.md §4.F "Column text pool").

use std::collections::HashMap;

use crate::bytes::{align, write_u16_le};
use crate::subheader::ColumnText;

/// Default maximum payload size for a `ColumnText` subheader.
pub const DEFAULT_MAX_SIZE: usize = 32_740;
/// A historical SAS value used instead of [`DEFAULT_MAX_SIZE`] when a
/// string fits within it and the current page is tight on space.
pub const HISTORICAL_MAX_SIZE: usize = 32_676;

/// A reference into the text pool: which `ColumnText` subheader (by
/// 0-based emission index) holds the string, its byte offset from that
/// subheader's signature, and its byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextReference {
    pub subheader_index: u16,
    pub offset_from_signature: u16,
    pub length: u16,
}

impl TextReference {
    const EMPTY: Self = Self {
        subheader_index: 0,
        offset_from_signature: 0,
        length: 0,
    };

    /// Writes this reference as the 6-byte triple SAS uses throughout the
    /// subheader family, with the empty string's reference written as
    /// three zeros.
    pub fn write(self, buf: &mut [u8], offset: usize) {
        write_u16_le(buf, offset, self.subheader_index);
        write_u16_le(buf, offset + 2, self.offset_from_signature);
        write_u16_le(buf, offset + 4, self.length);
    }
}

struct OpenSubheader {
    payload: Vec<u8>,
    max_size: usize,
    emission_index: u16,
}

/// Chunks interned strings into one or more `ColumnText` subheaders.
///
/// Every `add` after the first finds or creates a subheader with room for
/// the string, 4-byte-aligning each string's start within the payload.
pub struct TextPool {
    seen: HashMap<String, TextReference>,
    finalised: Vec<ColumnText>,
    open: Option<OpenSubheader>,
    next_index: u16,
    intern_duplicates: bool,
}

impl TextPool {
    /// Creates an empty pool. `intern_duplicates` mirrors SAS's own
    /// default of re-interning a string each time it is added rather than
    /// reusing the first occurrence's reference (spec.md §3, "Duplicate
    /// strings may be re-interned (a configurable flag; default true)").
    #[must_use]
    pub fn new(intern_duplicates: bool) -> Self {
        Self {
            seen: HashMap::new(),
            finalised: Vec::new(),
            open: None,
            next_index: 0,
            intern_duplicates,
        }
    }

    /// Interns `s`, returning its text-pool reference. The empty string
    /// always resolves to [`TextReference::EMPTY`] without touching any
    /// subheader.
    pub fn add(&mut self, s: &str, remaining_page_bytes: impl FnOnce() -> usize) -> TextReference {
        if s.is_empty() {
            return TextReference::EMPTY;
        }
        if !self.intern_duplicates {
            if let Some(&existing) = self.seen.get(s) {
                return existing;
            }
        }

        let needed = align(s.len(), 4);
        if self.open.is_none() || !self.has_room(needed) {
            self.roll_subheader(needed, remaining_page_bytes());
        }

        let open = self.open.as_mut().expect("just ensured an open subheader exists");
        let offset_from_signature = (16 + open.payload.len()) as u16;
        open.payload.extend_from_slice(s.as_bytes());
        let padding = needed - s.len();
        open.payload.extend(std::iter::repeat(0u8).take(padding));

        let reference = TextReference {
            subheader_index: open.emission_index,
            offset_from_signature,
            length: s.len() as u16,
        };
        self.seen.insert(s.to_owned(), reference);
        reference
    }

    fn has_room(&self, needed: usize) -> bool {
        self.open.as_ref().is_some_and(|open| open.payload.len() + needed <= open.max_size)
    }

    fn roll_subheader(&mut self, needed: usize, remaining_page_bytes: usize) {
        if let Some(open) = self.open.take() {
            self.commit(open);
        }
        let clamp_hi = if needed <= HISTORICAL_MAX_SIZE && remaining_page_bytes < DEFAULT_MAX_SIZE {
            HISTORICAL_MAX_SIZE
        } else {
            DEFAULT_MAX_SIZE
        };
        let candidate = align(remaining_page_bytes, 4).clamp(needed, clamp_hi);
        self.open = Some(OpenSubheader {
            payload: Vec::with_capacity(candidate),
            max_size: candidate,
            emission_index: self.next_index,
        });
        self.next_index += 1;
    }

    fn commit(&mut self, open: OpenSubheader) {
        let mut payload = open.payload;
        let padding = open.max_size.saturating_sub(payload.len());
        if padding >= 8 {
            let pad_start = payload.len();
            payload.resize(open.max_size, 0);
            write_u16_le(&mut payload, pad_start, 1);
            write_u16_le(&mut payload, pad_start + 4, padding as u16);
        }
        self.finalised.push(ColumnText::new(payload));
    }

    /// Commits the still-open subheader, if any. Idempotent.
    pub fn finalise(&mut self) {
        if let Some(open) = self.open.take() {
            self.commit(open);
        }
    }

    /// Removes and returns every subheader committed so far (by a roll or
    /// by [`Self::finalise`]), leaving any still-open subheader untouched.
    ///
    /// Callers that need each `ColumnText` subheader added to the page
    /// layout as soon as it is committed (spec.md §4.H: "ColumnText pool
    /// (added as strings are interned)") call this after every [`Self::add`]
    /// rather than waiting for [`Self::into_subheaders`].
    pub fn drain_committed(&mut self) -> Vec<ColumnText> {
        std::mem::take(&mut self.finalised)
    }

    /// The finalised `ColumnText` subheaders, in emission order. Only
    /// meaningful after [`Self::finalise`].
    #[must_use]
    pub fn into_subheaders(self) -> Vec<ColumnText> {
        self.finalised
    }
}

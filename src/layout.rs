//! Row variable layout (spec.md §4.C "Variable layout").
//!
//! Assigns each variable a physical byte offset within a row: numeric
//! variables first (in schema order), then character variables, mirroring
//! how SAS itself reorders storage regardless of declaration order.

use crate::bytes::align;
use crate::schema::{Schema, VariableKind};

/// Physical placement of a schema's variables within one row.
#[derive(Debug, Clone)]
pub struct VariableLayout {
    offsets: Vec<usize>,
    row_length: usize,
}

impl VariableLayout {
    /// Computes physical offsets for every variable in `schema`.
    #[must_use]
    pub fn new(schema: &Schema) -> Self {
        let variables = schema.variables();
        let mut offsets = vec![0usize; variables.len()];
        let mut cursor = 0usize;
        let mut has_numeric = false;

        for (i, variable) in variables.iter().enumerate() {
            if variable.kind() == VariableKind::Numeric {
                has_numeric = true;
                offsets[i] = cursor;
                cursor += usize::from(variable.length());
            }
        }
        for (i, variable) in variables.iter().enumerate() {
            if variable.kind() == VariableKind::Character {
                offsets[i] = cursor;
                cursor += usize::from(variable.length());
            }
        }

        let row_length = if has_numeric { align(cursor, 8) } else { cursor };
        Self { offsets, row_length }
    }

    /// The physical byte offset of variable `i` (schema order) within a
    /// row.
    #[must_use]
    pub fn physical_offset(&self, i: usize) -> usize {
        self.offsets[i]
    }

    /// The total byte length of one encoded row, 8-byte aligned if the
    /// schema contains any numeric variable.
    #[must_use]
    pub const fn row_length(&self) -> usize {
        self.row_length
    }
}

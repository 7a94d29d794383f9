//! Row encoding (spec.md §4.D "Row encoder").
//!
//! `encode_row` writes one caller-supplied row of [`Value`]s into a
//! pre-allocated buffer. The buffer is expected to already be space-filled
//! (0x20) before each call — the exporter reuses a single row-sized buffer
//! across rows, and re-filling it with spaces each time gives both
//! character truncation padding and the trailing row-alignment slack
//! (spec.md §8, scenario 3) the same space byte, without the encoder
//! needing to track where that slack begins.

use crate::datetime::{date_to_sas, datetime_to_sas, time_to_sas};
use crate::error::{Error, Result};
use crate::layout::VariableLayout;
use crate::missing::MissingValue;
use crate::schema::{Schema, VariableKind};
use crate::value::Value;

/// Fills `buf` with ASCII space (0x20), the pad byte used for both
/// character truncation and row-alignment slack.
pub fn fill_row_padding(buf: &mut [u8]) {
    buf.fill(b' ');
}

/// Encodes one row into `buf` starting at `offset`, using `layout` and
/// `schema` to place and type-check each value.
///
/// `row_index` is used only to annotate error messages.
///
/// # Errors
///
/// Returns [`Error::Arity`] if `row.len()` does not match the schema's
/// variable count. Returns [`Error::Type`] if a value's runtime kind does
/// not match its variable's declared kind. Returns [`Error::Truncation`]
/// if a character value's UTF-8 byte length exceeds the variable's
/// declared length.
#[cfg_attr(feature = "hotpath", hotpath::measure)]
pub fn encode_row(
    buf: &mut [u8],
    offset: usize,
    schema: &Schema,
    layout: &VariableLayout,
    row_index: u64,
    row: &[Value<'_>],
) -> Result<()> {
    let variables = schema.variables();
    if row.len() != variables.len() {
        return Err(Error::Arity {
            row: row_index,
            actual: row.len(),
            expected: variables.len(),
        });
    }

    for (i, (variable, value)) in variables.iter().zip(row).enumerate() {
        let field_offset = offset + layout.physical_offset(i);
        let length = usize::from(variable.length());
        let field = &mut buf[field_offset..field_offset + length];

        match variable.kind() {
            VariableKind::Character => {
                let Value::Str(s) = value else {
                    return Err(Error::Type {
                        row: row_index,
                        column: i,
                        name: variable.name().to_owned().into(),
                        details: "expected a character value".into(),
                    });
                };
                let bytes = s.as_bytes();
                if bytes.len() > length {
                    return Err(Error::Truncation {
                        row: row_index,
                        column: i,
                        name: variable.name().to_owned().into(),
                        actual: bytes.len(),
                        limit: length,
                    });
                }
                field[..bytes.len()].copy_from_slice(bytes);
                field[bytes.len()..].fill(b' ');
            }
            VariableKind::Numeric => {
                let bits = numeric_bits(value, row_index, i, variable.name())?;
                write_shortened_numeric(field, bits);
            }
        }
    }
    Ok(())
}

/// Resolves a row value to the 8-byte IEEE-754 bit pattern a numeric
/// variable stores, per spec.md §4.D's numeric value kinds.
fn numeric_bits(value: &Value<'_>, row: u64, column: usize, name: &str) -> Result<u64> {
    match value {
        Value::Missing(m) => Ok(m.bits()),
        Value::Number(n) => {
            if !n.is_finite() {
                return Err(Error::Type {
                    row,
                    column,
                    name: name.to_owned().into(),
                    details: "numeric value must be finite; use MissingValue for non-finite data"
                        .into(),
                });
            }
            Ok(n.to_bits())
        }
        Value::Date(d) => Ok(date_to_sas(*d).to_bits()),
        Value::Time(t) => Ok(time_to_sas(*t).to_bits()),
        Value::DateTime(dt) => Ok(datetime_to_sas(*dt)?.to_bits()),
        Value::Str(_) => Err(Error::Type {
            row,
            column,
            name: name.to_owned().into(),
            details: "expected a numeric value, got a character value".into(),
        }),
    }
}

/// The system-missing sentinel, used when a caller passes no value at all
/// for a numeric cell (spec.md §4.D, "null -> Standard missing's raw
/// bits").
#[must_use]
pub fn null_numeric_bits() -> u64 {
    MissingValue::Standard.bits()
}

/// Writes the top `field.len()` bytes of `bits`'s little-endian encoding
/// into `field`, matching SAS's shortened-numeric storage: a variable
/// declared with fewer than 8 bytes keeps only the most significant bytes
/// of the double, dropping low-order mantissa precision.
fn write_shortened_numeric(field: &mut [u8], bits: u64) {
    let full = bits.to_le_bytes();
    let skip = 8 - field.len();
    field.copy_from_slice(&full[skip..8]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Format, Strictness, Variable};

    fn schema_with(variables: Vec<Variable>) -> Schema {
        let mut builder = Schema::builder().name("T");
        for variable in variables {
            builder = builder.variable(variable);
        }
        builder.build().unwrap()
    }

    fn numeric(name: &str, length: u16) -> Variable {
        Variable::new(
            name,
            VariableKind::Numeric,
            length,
            "",
            Format::unspecified(),
            Format::unspecified(),
            Strictness::Any,
        )
        .unwrap()
    }

    fn character(name: &str, length: u16) -> Variable {
        Variable::new(
            name,
            VariableKind::Character,
            length,
            "",
            Format::unspecified(),
            Format::unspecified(),
            Strictness::Any,
        )
        .unwrap()
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let schema = schema_with(vec![numeric("N", 8)]);
        let layout = VariableLayout::new(&schema);
        let mut buf = vec![b' '; layout.row_length()];
        let err = encode_row(&mut buf, 0, &schema, &layout, 0, &[]).unwrap_err();
        assert!(matches!(err, Error::Arity { expected: 1, actual: 0, .. }));
    }

    #[test]
    fn character_truncation_is_rejected() {
        let schema = schema_with(vec![character("S", 2)]);
        let layout = VariableLayout::new(&schema);
        let mut buf = vec![b' '; layout.row_length()];
        let err = encode_row(&mut buf, 0, &schema, &layout, 0, &[Value::from("abc")]).unwrap_err();
        assert!(matches!(err, Error::Truncation { limit: 2, actual: 3, .. }));
    }

    #[test]
    fn mixed_row_matches_scenario_three() {
        let schema = schema_with(vec![character("S", 4), numeric("N", 8)]);
        let layout = VariableLayout::new(&schema);
        assert_eq!(layout.row_length(), 16);
        let mut buf = vec![b' '; layout.row_length()];
        fill_row_padding(&mut buf);
        encode_row(&mut buf, 0, &schema, &layout, 0, &[Value::from("hi"), Value::from(7.0)]).unwrap();

        assert_eq!(&buf[0..8], &7.0f64.to_le_bytes());
        assert_eq!(&buf[8..12], b"hi  ");
        assert_eq!(&buf[12..16], b"    ");
    }

    #[test]
    fn missing_value_writes_sentinel_bits() {
        let schema = schema_with(vec![numeric("N", 8)]);
        let layout = VariableLayout::new(&schema);
        let mut buf = vec![b' '; layout.row_length()];
        encode_row(&mut buf, 0, &schema, &layout, 0, &[Value::from(MissingValue::Standard)]).unwrap();
        assert_eq!(buf, MissingValue::Standard.to_le_bytes());
    }

    #[test]
    fn shortened_numeric_keeps_top_bytes() {
        let mut field = [0u8; 4];
        write_shortened_numeric(&mut field, 7.0f64.to_bits());
        assert_eq!(field, 7.0f64.to_le_bytes()[4..8]);
    }
}

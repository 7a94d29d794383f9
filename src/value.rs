//! Row-level cell values (spec.md §3 "Data Model", "Row").
//!
//! This is the write-side counterpart of a parser's `Value`/`Cell` types:
//! instead of decoding bytes into a value, [`encode`](crate::row::encode_row)
//! consumes these to produce bytes.

use std::borrow::Cow;

use time::{Date, OffsetDateTime, Time};

use crate::missing::MissingValue;

/// A single cell supplied by the caller for one row, one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// A numeric value. Must be finite — `NaN`/`inf` are rejected by the
    /// row encoder, since SAS reserves the NaN bit patterns for missing
    /// values.
    Number(f64),
    /// A character value. Must fit within the variable's declared length
    /// in UTF-8 bytes.
    Str(Cow<'a, str>),
    /// A calendar date, stored as days since 1960-01-01.
    Date(Date),
    /// A time of day, stored as seconds since midnight.
    Time(Time),
    /// A calendar date and time, stored as seconds since
    /// 1960-01-01T00:00:00.
    DateTime(OffsetDateTime),
    /// A missing numeric value (spec.md §3 "Missing value").
    Missing(MissingValue),
}

impl<'a> Value<'a> {
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Borrows the value so it can be reused after a call that needs an
    /// owned row.
    #[must_use]
    pub fn as_ref(&'a self) -> Value<'a> {
        match self {
            Self::Number(n) => Value::Number(*n),
            Self::Str(s) => Value::Str(Cow::Borrowed(s.as_ref())),
            Self::Date(d) => Value::Date(*d),
            Self::Time(t) => Value::Time(*t),
            Self::DateTime(dt) => Value::DateTime(*dt),
            Self::Missing(m) => Value::Missing(*m),
        }
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Self::Str(Cow::Owned(value))
    }
}

impl From<MissingValue> for Value<'_> {
    fn from(value: MissingValue) -> Self {
        Self::Missing(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_missing_only_for_missing_variant() {
        assert!(Value::from(MissingValue::Standard).is_missing());
        assert!(!Value::from(1.0).is_missing());
    }

    #[test]
    fn conversions_cover_common_inputs() {
        assert_eq!(Value::from(1.5), Value::Number(1.5));
        assert_eq!(Value::from("hi"), Value::Str(Cow::Borrowed("hi")));
        assert_eq!(Value::from("hi".to_owned()), Value::Str(Cow::Owned("hi".to_owned())));
    }
}

//! SAS variable (column) descriptors (spec.md §3 "Variable").

use super::format::Format;
use crate::error::{Error, Result};

/// Storage kind of a variable: a SAS dataset has exactly two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Numeric,
    Character,
}

/// How strictly a variable's name (and, for `Fda`, its label and length)
/// are validated — spec.md §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Name must be 1..=32 UTF-8 bytes; nothing else is checked.
    #[default]
    Any,
    /// Name must match `[A-Za-z_]\w{0,7}` (a SAS "basic" identifier).
    Basic,
    /// `Basic`, plus the label must be ASCII and character length <= 200.
    Fda,
}

const MAX_NAME_BYTES: usize = 32;
const MAX_LABEL_BYTES: usize = 256;
const FDA_MAX_CHAR_LENGTH: usize = 200;
const MAX_CHAR_LENGTH: u16 = 32_767;

/// An immutable SAS variable (column) descriptor.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    length: u16,
    label: String,
    output_format: Format,
    input_format: Format,
}

impl Variable {
    /// Builds a variable, validating name, kind/length pairing, and label
    /// length against `strictness`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArgument`] if:
    /// - `name` is empty, exceeds 32 UTF-8 bytes, or (under `Basic`/`Fda`)
    ///   does not match `[A-Za-z_]\w{0,7}`;
    /// - `length` is outside `2..=8` for [`VariableKind::Numeric`] or
    ///   `1..=32_767` for [`VariableKind::Character`];
    /// - `label` exceeds 256 UTF-8 bytes, or (under `Fda`) is non-ASCII;
    /// - under `Fda`, a character variable's `length` exceeds 200.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        kind: VariableKind,
        length: u16,
        label: impl Into<String>,
        output_format: Format,
        input_format: Format,
        strictness: Strictness,
    ) -> Result<Self> {
        let name = name.into();
        let label = label.into();
        validate_name(&name, strictness)?;
        validate_length(kind, length)?;
        if label.len() > MAX_LABEL_BYTES {
            return Err(Error::bad_argument(
                "variable.label",
                format!(
                    "label for '{name}' is {} bytes, limit is {MAX_LABEL_BYTES}",
                    label.len()
                ),
            ));
        }
        if strictness == Strictness::Fda {
            if !label.is_ascii() {
                return Err(Error::bad_argument(
                    "variable.label",
                    format!("FDA strictness requires an ASCII label for '{name}'"),
                ));
            }
            if kind == VariableKind::Character && usize::from(length) > FDA_MAX_CHAR_LENGTH {
                return Err(Error::bad_argument(
                    "variable.length",
                    format!(
                        "FDA strictness caps character length at {FDA_MAX_CHAR_LENGTH}, got {length} for '{name}'"
                    ),
                ));
            }
        }
        Ok(Self {
            name,
            kind,
            length,
            label,
            output_format,
            input_format,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> VariableKind {
        self.kind
    }

    #[must_use]
    pub const fn length(&self) -> u16 {
        self.length
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn output_format(&self) -> &Format {
        &self.output_format
    }

    #[must_use]
    pub const fn input_format(&self) -> &Format {
        &self.input_format
    }

    /// Case-insensitive, trailing-space-trimmed name used for schema
    /// uniqueness checks (spec.md §3 "Schema").
    #[must_use]
    pub(crate) fn normalized_name(&self) -> String {
        self.name.trim_end().to_ascii_uppercase()
    }
}

fn validate_name(name: &str, strictness: Strictness) -> Result<()> {
    if name.is_empty() {
        return Err(Error::bad_argument("variable.name", "name must not be empty"));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(Error::bad_argument(
            "variable.name",
            format!("name '{name}' is {} bytes, limit is {MAX_NAME_BYTES}", name.len()),
        ));
    }
    if strictness != Strictness::Any {
        let mut chars = name.chars();
        let first = chars.next().expect("checked non-empty above");
        let first_ok = first.is_ascii_alphabetic() || first == '_';
        let rest_ok = chars.clone().all(|c| c.is_ascii_alphanumeric() || c == '_');
        let byte_len_ok = name.len() <= 8 && name.is_ascii();
        if !(first_ok && rest_ok && byte_len_ok) {
            return Err(Error::bad_argument(
                "variable.name",
                format!("'{name}' does not match the identifier pattern [A-Za-z_]\\w{{0,7}}"),
            ));
        }
    }
    Ok(())
}

fn validate_length(kind: VariableKind, length: u16) -> Result<()> {
    match kind {
        VariableKind::Numeric if !(2..=8).contains(&length) => Err(Error::bad_argument(
            "variable.length",
            format!("numeric length must be 2..=8, got {length}"),
        )),
        VariableKind::Character if length == 0 => Err(Error::bad_argument(
            "variable.length",
            "character length must be at least 1",
        )),
        VariableKind::Character if length > MAX_CHAR_LENGTH => Err(Error::bad_argument(
            "variable.length",
            format!("character length must be 1..={MAX_CHAR_LENGTH}, got {length}"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, kind: VariableKind, length: u16, strictness: Strictness) -> Result<Variable> {
        Variable::new(
            name,
            kind,
            length,
            "",
            Format::unspecified(),
            Format::unspecified(),
            strictness,
        )
    }

    #[test]
    fn accepts_minimal_numeric_variable() {
        assert!(var("X", VariableKind::Numeric, 8, Strictness::Any).is_ok());
    }

    #[test]
    fn rejects_numeric_length_out_of_range() {
        assert!(var("X", VariableKind::Numeric, 1, Strictness::Any).is_err());
        assert!(var("X", VariableKind::Numeric, 9, Strictness::Any).is_err());
    }

    #[test]
    fn rejects_zero_length_character() {
        assert!(var("X", VariableKind::Character, 0, Strictness::Any).is_err());
    }

    #[test]
    fn rejects_character_length_above_32767() {
        assert!(var("X", VariableKind::Character, 32_767, Strictness::Any).is_ok());
        assert!(var("X", VariableKind::Character, 32_768, Strictness::Any).is_err());
        assert!(var("X", VariableKind::Character, u16::MAX, Strictness::Any).is_err());
    }

    #[test]
    fn basic_strictness_enforces_identifier_pattern() {
        assert!(var("valid_name1", VariableKind::Numeric, 8, Strictness::Basic).is_ok());
        assert!(var("1bad", VariableKind::Numeric, 8, Strictness::Basic).is_err());
        assert!(var("way_too_long_name", VariableKind::Numeric, 8, Strictness::Basic).is_err());
        assert!(var("has space", VariableKind::Numeric, 8, Strictness::Basic).is_err());
    }

    #[test]
    fn any_strictness_allows_long_non_identifier_names() {
        assert!(var("a name with spaces", VariableKind::Numeric, 8, Strictness::Any).is_ok());
    }

    #[test]
    fn fda_rejects_non_ascii_label() {
        let result = Variable::new(
            "X",
            VariableKind::Numeric,
            8,
            "caf\u{e9}",
            Format::unspecified(),
            Format::unspecified(),
            Strictness::Fda,
        );
        assert!(result.is_err());
    }

    #[test]
    fn fda_caps_character_length_at_200() {
        assert!(var("X", VariableKind::Character, 200, Strictness::Fda).is_ok());
        assert!(var("X", VariableKind::Character, 201, Strictness::Fda).is_err());
    }

    #[test]
    fn normalized_name_trims_and_uppercases() {
        let v = var("foo ", VariableKind::Numeric, 8, Strictness::Any).unwrap();
        assert_eq!(v.normalized_name(), "FOO");
    }
}

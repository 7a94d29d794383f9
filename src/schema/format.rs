//! SAS output/input format descriptors (spec.md §3 "Format").

use crate::error::{Error, Result};

/// A SAS format reference: a name, a display width, and a decimal-digit
/// count. An empty name with both numbers zero means "unspecified".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    name: String,
    width: u16,
    decimals: u16,
}

impl Format {
    /// The "unspecified" format: empty name, zero width, zero decimals.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::default()
    }

    /// Builds a named format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArgument`] if `name` is longer than 8 ASCII
    /// bytes or contains non-ASCII characters.
    pub fn new(name: impl Into<String>, width: u16, decimals: u16) -> Result<Self> {
        let name = name.into();
        if !name.is_ascii() {
            return Err(Error::bad_argument(
                "format.name",
                "format name must be ASCII",
            ));
        }
        if name.len() > 8 {
            return Err(Error::bad_argument(
                "format.name",
                format!("format name '{name}' is {} bytes, limit is 8", name.len()),
            ));
        }
        Ok(Self {
            name,
            width,
            decimals,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn decimals(&self) -> u16 {
        self.decimals
    }

    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.name.is_empty() && self.width == 0 && self.decimals == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_is_empty_and_zeroed() {
        let format = Format::unspecified();
        assert!(format.is_unspecified());
    }

    #[test]
    fn rejects_name_over_eight_bytes() {
        assert!(Format::new("TOOLONGNAME", 0, 0).is_err());
    }

    #[test]
    fn rejects_non_ascii_name() {
        assert!(Format::new("é", 0, 0).is_err());
    }

    #[test]
    fn accepts_eight_byte_name() {
        assert!(Format::new("DATETIME", 19, 0).is_ok());
    }
}

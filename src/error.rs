use std::borrow::Cow;
use std::fmt;
use std::io;

/// Result type used across the SAS7BDAT export engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while constructing a dataset or writing it to a stream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while writing to the underlying output stream.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A constructor argument exceeded its byte budget, used a disallowed
    /// character, or fell outside its valid range.
    #[error("invalid argument for {field}: {details}")]
    BadArgument {
        field: Cow<'static, str>,
        details: Cow<'static, str>,
    },

    /// The variable list supplied to a [`crate::schema::Schema`] is empty,
    /// too long, or contains duplicate names after normalisation.
    #[error("invalid schema: {details}")]
    BadSchema { details: Cow<'static, str> },

    /// A row value's runtime type does not match its variable's kind.
    #[error("row {row}, column {column} ({name}): {details}")]
    Type {
        row: u64,
        column: usize,
        name: Cow<'static, str>,
        details: Cow<'static, str>,
    },

    /// A character value's UTF-8 byte length exceeds the variable's length.
    #[error(
        "row {row}, column {column} ({name}): value is {actual} bytes, exceeds length {limit}"
    )]
    Truncation {
        row: u64,
        column: usize,
        name: Cow<'static, str>,
        actual: usize,
        limit: usize,
    },

    /// A row's value count differs from the schema's variable count.
    #[error("row {row} has {actual} values, expected {expected}")]
    Arity {
        row: u64,
        actual: usize,
        expected: usize,
    },

    /// `write_row` was called after the declared row count was reached.
    #[error("write_row called after all {declared} declared rows were written")]
    TooManyRows { declared: u64 },

    /// `write_row` or `close` was called after the exporter was closed.
    #[error("operation attempted on a closed exporter")]
    ExporterClosed,

    /// More pages were requested than the page sequencer can address
    /// (index 0x7FFF).
    #[error("page sequence exhausted at page {page}")]
    SequenceExhausted { page: u64 },

    /// An internal accounting invariant was violated; this indicates a
    /// defect in the export engine, not a caller error.
    #[error("internal invariant violated in {stage}: {details}")]
    Invariant {
        stage: ExportStage,
        details: Cow<'static, str>,
    },
}

/// Identifies which part of the file was being produced when a problem was
/// detected; used only for diagnostic messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStage {
    Header,
    Page { index: u64 },
    Subheader { signature: u64, page: u64 },
    Row { index: u64 },
    TextPool,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "file header"),
            Self::Page { index } => write!(f, "page {index}"),
            Self::Subheader { signature, page } => {
                write!(f, "subheader signature 0x{signature:016X} on page {page}")
            }
            Self::Row { index } => write!(f, "row {index}"),
            Self::TextPool => write!(f, "column text pool"),
        }
    }
}

impl Error {
    #[must_use]
    pub fn bad_argument(field: &'static str, details: impl Into<Cow<'static, str>>) -> Self {
        Self::BadArgument {
            field: Cow::Borrowed(field),
            details: details.into(),
        }
    }

    #[must_use]
    pub fn bad_schema(details: impl Into<Cow<'static, str>>) -> Self {
        Self::BadSchema {
            details: details.into(),
        }
    }

    #[must_use]
    pub fn invariant(stage: ExportStage, details: impl Into<Cow<'static, str>>) -> Self {
        Self::Invariant {
            stage,
            details: details.into(),
        }
    }
}

//! A streaming SAS7BDAT export engine: build a [`schema::Schema`], then
//! hand rows to an [`exporter::Exporter`] (or the one-shot
//! [`exporter::export_dataset`]) to produce an uncompressed, 64-bit,
//! little-endian, UTF-8 SAS7BDAT file.

pub mod bytes;
pub mod datetime;
pub mod error;
pub mod exporter;
pub mod header;
pub mod layout;
pub mod logger;
pub mod missing;
pub mod page;
pub mod page_layout;
pub mod row;
pub mod schema;
pub mod sequence;
pub mod subheader;
pub mod text_pool;
pub mod value;

pub use crate::error::{Error, Result};
pub use exporter::{export_dataset, Exporter};
pub use missing::MissingValue;
pub use schema::{Format, Schema, SchemaBuilder, Strictness, Variable, VariableKind};
pub use value::Value;

//! Dataset schema types: [`Schema`], [`Variable`], [`VariableKind`],
//! [`Strictness`], and [`Format`] (spec.md §3 "Schema", "Variable",
//! "Format").

mod format;
mod schema;
mod variable;

pub use format::Format;
pub use schema::{Schema, SchemaBuilder};
pub use variable::{Strictness, Variable, VariableKind};

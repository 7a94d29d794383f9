//! The dataset schema: creation time, naming metadata, and variable list
//! (spec.md §3 "Schema").

use std::collections::HashSet;

use time::OffsetDateTime;

use super::variable::Variable;
use crate::error::{Error, Result};

const MAX_NAME_BYTES: usize = 64;
const MAX_TYPE_BYTES: usize = 8;
const MAX_LABEL_BYTES: usize = 256;
const MAX_VARIABLES: usize = 32_767;

/// An immutable dataset schema: everything needed to emit a SAS7BDAT file
/// except the row data itself.
#[derive(Debug, Clone)]
pub struct Schema {
    created: OffsetDateTime,
    name: String,
    dataset_type: String,
    label: String,
    variables: Vec<Variable>,
}

impl Schema {
    /// Starts building a schema with `created = now`, `dataset_type =
    /// "DATA"`, and an empty name/label, matching spec.md §6's builder
    /// defaults.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    #[must_use]
    pub const fn created(&self) -> OffsetDateTime {
        self.created
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dataset_type(&self) -> &str {
        &self.dataset_type
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

/// Builds a [`Schema`], validating the spec.md §3 byte budgets and the
/// uniqueness of variable names.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    created: Option<OffsetDateTime>,
    name: String,
    dataset_type: String,
    label: String,
    variables: Vec<Variable>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self {
            created: None,
            name: String::new(),
            dataset_type: "DATA".to_owned(),
            label: String::new(),
            variables: Vec::new(),
        }
    }
}

impl SchemaBuilder {
    #[must_use]
    pub fn created(mut self, created: OffsetDateTime) -> Self {
        self.created = Some(created);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn dataset_type(mut self, dataset_type: impl Into<String>) -> Self {
        self.dataset_type = dataset_type.into();
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Validates and finalises the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArgument`] if `name`, `dataset_type`, or `label`
    /// exceed their byte budgets. Returns [`Error::BadSchema`] if the
    /// variable list is empty, exceeds 32,767 entries, or contains two
    /// variables whose case-insensitive, trailing-space-trimmed names
    /// collide.
    pub fn build(self) -> Result<Schema> {
        if self.name.len() > MAX_NAME_BYTES {
            return Err(Error::bad_argument(
                "schema.name",
                format!(
                    "dataset name '{}' is {} bytes, limit is {MAX_NAME_BYTES}",
                    self.name,
                    self.name.len()
                ),
            ));
        }
        if self.dataset_type.len() > MAX_TYPE_BYTES {
            return Err(Error::bad_argument(
                "schema.dataset_type",
                format!(
                    "dataset type '{}' is {} bytes, limit is {MAX_TYPE_BYTES}",
                    self.dataset_type,
                    self.dataset_type.len()
                ),
            ));
        }
        if self.label.len() > MAX_LABEL_BYTES {
            return Err(Error::bad_argument(
                "schema.label",
                format!("dataset label is {} bytes, limit is {MAX_LABEL_BYTES}", self.label.len()),
            ));
        }
        if self.variables.is_empty() {
            return Err(Error::bad_schema("schema must declare at least one variable"));
        }
        if self.variables.len() > MAX_VARIABLES {
            return Err(Error::bad_schema(format!(
                "schema declares {} variables, limit is {MAX_VARIABLES}",
                self.variables.len()
            )));
        }
        let mut seen = HashSet::with_capacity(self.variables.len());
        for variable in &self.variables {
            if !seen.insert(variable.normalized_name()) {
                return Err(Error::bad_schema(format!(
                    "duplicate variable name '{}' (case-insensitive, trailing-space-trimmed)",
                    variable.name()
                )));
            }
        }
        Ok(Schema {
            created: self.created.unwrap_or_else(OffsetDateTime::now_utc),
            name: self.name,
            dataset_type: self.dataset_type,
            label: self.label,
            variables: self.variables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Format, Strictness, VariableKind};

    fn numeric(name: &str) -> Variable {
        Variable::new(
            name,
            VariableKind::Numeric,
            8,
            "",
            Format::unspecified(),
            Format::unspecified(),
            Strictness::Any,
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_variable_list() {
        assert!(Schema::builder().name("T").build().is_err());
    }

    #[test]
    fn rejects_duplicate_names_after_normalisation() {
        let result = Schema::builder()
            .variable(numeric("Foo"))
            .variable(numeric("foo "))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn accepts_distinct_names() {
        let schema = Schema::builder()
            .name("T")
            .variable(numeric("A"))
            .variable(numeric("B"))
            .build()
            .unwrap();
        assert_eq!(schema.variable_count(), 2);
        assert_eq!(schema.dataset_type(), "DATA");
    }

    #[test]
    fn rejects_name_over_64_bytes() {
        let long_name = "x".repeat(65);
        let result = Schema::builder().name(long_name).variable(numeric("A")).build();
        assert!(result.is_err());
    }
}

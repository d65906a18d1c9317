use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `(schema, name)` pair naming a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedIdentifier {
    schema: String,
    name: String,
}

impl QualifiedIdentifier {
    /// Build an identifier; both parts must be non-empty.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let name = name.into();
        if schema.is_empty() {
            return Err(Error::InvalidIdentifier(format!(
                "schema is empty for table '{name}'"
            )));
        }
        if name.is_empty() {
            return Err(Error::InvalidIdentifier(format!(
                "table name is empty in schema '{schema}'"
            )));
        }
        Ok(Self { schema, name })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// A table or view exposed by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub schema: String,
    pub name: String,
    /// True when rows can be inserted directly or through an INSTEAD OF trigger.
    pub insertable: bool,
}

/// Single-column reference from a column to a column of another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    #[serde(rename = "table")]
    pub referenced_table: String,
    #[serde(rename = "column")]
    pub referenced_column: String,
}

/// Column metadata for a table or view.
///
/// Field order matches the serialized contract consumed by API layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub schema: String,
    /// Owning table; implied by the request, so it is not serialized.
    #[serde(skip)]
    pub table: String,
    pub name: String,
    /// 1-based ordinal position as reported by the catalog.
    pub position: i32,
    pub nullable: bool,
    /// Catalog type name (e.g. `integer`, `character varying`, `USER-DEFINED`).
    #[serde(rename = "type")]
    pub col_type: String,
    pub updatable: bool,
    #[serde(rename = "maxLen")]
    pub max_len: Option<i32>,
    pub precision: Option<i32>,
    #[serde(rename = "references")]
    pub foreign_key: Option<ForeignKey>,
    #[serde(rename = "default")]
    pub default_value: Option<String>,
    /// Enum labels in declared sort order; empty when the type is not an enum.
    #[serde(rename = "enum")]
    pub enum_values: Vec<String>,
}

/// Columns and primary key of a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableDescription {
    pub columns: Vec<Column>,
    pub pkey: Vec<String>,
}

use std::collections::BTreeMap;

use async_trait::async_trait;

use pgshape_core::{Column, ForeignKey, QualifiedIdentifier, Result, Table, TableDescription};

/// Trait implemented by database adapters that can describe a schema's shape.
#[async_trait]
pub trait Adapter {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Tables and views of `schema`, ordered by name.
    async fn tables(&self, schema: &str) -> Result<Vec<Table>>;

    /// Columns of `table` in ordinal order, with enum labels and references attached.
    async fn columns(&self, table: &QualifiedIdentifier) -> Result<Vec<Column>>;

    /// Primary key column names of `table`; empty when it has none.
    async fn primary_key(&self, table: &QualifiedIdentifier) -> Result<Vec<String>>;

    /// Foreign keys of `table` keyed by referencing column.
    async fn foreign_keys(
        &self,
        table: &QualifiedIdentifier,
    ) -> Result<BTreeMap<String, ForeignKey>>;

    /// Whether a function named `name` exists in `schema`.
    async fn procedure_exists(&self, schema: &str, name: &str) -> Result<bool>;

    /// Columns and primary key of `table` read in a single transaction.
    async fn describe_table(&self, table: &QualifiedIdentifier) -> Result<TableDescription>;
}

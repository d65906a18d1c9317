use std::collections::BTreeMap;

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use pgshape_core::{
    Column, Error, ForeignKey, QualifiedIdentifier, Result, Table, TableDescription,
};

use crate::adapter::Adapter;

mod mapper;
mod queries;

/// Adapter for PostgreSQL databases.
///
/// Every call runs inside its own read-only transaction.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_read_only(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        sqlx::query("set transaction read only")
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(tx)
    }
}

async fn finish(tx: Transaction<'static, Postgres>) -> Result<()> {
    tx.commit().await.map_err(|err| Error::Db(err.to_string()))
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn tables(&self, schema: &str) -> Result<Vec<Table>> {
        let mut tx = self.begin_read_only().await?;
        let tables = tables(&mut tx, schema).await?;
        finish(tx).await?;
        Ok(tables)
    }

    async fn columns(&self, table: &QualifiedIdentifier) -> Result<Vec<Column>> {
        let mut tx = self.begin_read_only().await?;
        let columns = columns(&mut tx, table).await?;
        finish(tx).await?;
        Ok(columns)
    }

    async fn primary_key(&self, table: &QualifiedIdentifier) -> Result<Vec<String>> {
        let mut tx = self.begin_read_only().await?;
        let pkey = primary_key(&mut tx, table).await?;
        finish(tx).await?;
        Ok(pkey)
    }

    async fn foreign_keys(
        &self,
        table: &QualifiedIdentifier,
    ) -> Result<BTreeMap<String, ForeignKey>> {
        let mut tx = self.begin_read_only().await?;
        let fks = foreign_keys(&mut tx, table).await?;
        finish(tx).await?;
        Ok(fks)
    }

    async fn procedure_exists(&self, schema: &str, name: &str) -> Result<bool> {
        let mut tx = self.begin_read_only().await?;
        let exists = procedure_exists(&mut tx, schema, name).await?;
        finish(tx).await?;
        Ok(exists)
    }

    async fn describe_table(&self, table: &QualifiedIdentifier) -> Result<TableDescription> {
        let mut tx = self.begin_read_only().await?;
        let description = describe_table(&mut tx, table).await?;
        finish(tx).await?;
        Ok(description)
    }
}

/// List tables and views in `schema`, ordered by name.
pub async fn tables(conn: &mut PgConnection, schema: &str) -> Result<Vec<Table>> {
    let raw = queries::list_tables(conn, schema).await?;
    tracing::debug!(event = "tables_listed", schema, count = raw.len());
    Ok(mapper::map_tables(raw))
}

/// List the columns of `table` with enum labels and references attached.
pub async fn columns(conn: &mut PgConnection, table: &QualifiedIdentifier) -> Result<Vec<Column>> {
    let raw = queries::list_columns(conn, table.schema(), table.name()).await?;
    let fks = foreign_keys(conn, table).await?;
    tracing::debug!(
        event = "columns_listed",
        table = %table,
        count = raw.len(),
        foreign_keys = fks.len()
    );
    Ok(mapper::assemble_columns(raw, &fks))
}

/// Primary key column names of `table`, in catalog order.
pub async fn primary_key(
    conn: &mut PgConnection,
    table: &QualifiedIdentifier,
) -> Result<Vec<String>> {
    queries::list_primary_key(conn, table.schema(), table.name()).await
}

/// Foreign keys declared on `table`, keyed by referencing column.
pub async fn foreign_keys(
    conn: &mut PgConnection,
    table: &QualifiedIdentifier,
) -> Result<BTreeMap<String, ForeignKey>> {
    let raw = queries::list_foreign_keys(conn, table.schema(), table.name()).await?;
    Ok(mapper::fold_foreign_keys(raw))
}

/// Whether a function named `name` exists in `schema`.
pub async fn procedure_exists(conn: &mut PgConnection, schema: &str, name: &str) -> Result<bool> {
    queries::procedure_exists(conn, schema, name).await
}

/// Columns and primary key of `table`, read on the same connection.
pub async fn describe_table(
    conn: &mut PgConnection,
    table: &QualifiedIdentifier,
) -> Result<TableDescription> {
    let columns = columns(conn, table).await?;
    let pkey = primary_key(conn, table).await?;
    Ok(TableDescription { columns, pkey })
}

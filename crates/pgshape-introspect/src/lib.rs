//! Catalog introspection for pgshape.
//!
//! The free functions in [`postgres`] run against a caller-owned connection
//! (typically `&mut *tx` of a read-only transaction). [`PostgresAdapter`]
//! wraps a pool and opens that transaction itself.

pub mod adapter;
pub mod postgres;

pub use adapter::Adapter;
pub use postgres::{
    PostgresAdapter, columns, describe_table, foreign_keys, primary_key, procedure_exists, tables,
};

pub use pgshape_core::{Column, ForeignKey, QualifiedIdentifier, Table, TableDescription};

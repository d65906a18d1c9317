//! Core contracts for pgshape.
//!
//! This crate defines the schema description types handed to API layers,
//! their JSON contract, and helpers shared by the adapters and the CLI.

pub mod error;
pub mod redaction;
pub mod schema;

pub use error::{Error, Result};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use schema::{Column, ForeignKey, QualifiedIdentifier, Table, TableDescription};

mod config;
mod logging;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use pgshape_core::{Error as CoreError, QualifiedIdentifier, redact_connection_string};
use pgshape_introspect::{Adapter, PostgresAdapter};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use config::{ConfigError, LogFormat, Overrides, Settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "pgshape", version, about = "Describe the shape of a Postgres schema as JSON")]
struct Cli {
    /// Path to a TOML config file (defaults to ./pgshape.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Database connection string.
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
    /// Schema to introspect (defaults to `public`).
    #[arg(long, global = true, env = "PGSHAPE_SCHEMA")]
    schema: Option<String>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    /// Write JSON to this file instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tables and views with their insertability.
    Tables,
    /// List columns of a table in ordinal order.
    Columns(TableArgs),
    /// List primary key columns of a table.
    PrimaryKey(TableArgs),
    /// Map referencing columns of a table to their targets.
    ForeignKeys(TableArgs),
    /// Check whether a function exists in the schema.
    ProcedureExists(ProcedureArgs),
    /// Columns and primary key of a table.
    Describe(TableArgs),
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Table or view name.
    table: String,
}

#[derive(Args, Debug)]
struct ProcedureArgs {
    /// Function name.
    name: String,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            database_url: self.database_url.clone(),
            schema: self.schema.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let file = config::load_file(cli.config.as_deref())?;
    let settings = Settings::resolve(file, cli.overrides())?;
    logging::init_logging(&settings.log_level, settings.log_format)?;

    run(cli.command, cli.out, &settings).await
}

async fn run(command: Command, out: Option<PathBuf>, settings: &Settings) -> Result<(), CliError> {
    let engine = detect_engine(&settings.database_url)?;
    let connection = redact_connection_string(&settings.database_url);
    tracing::info!(
        event = "connecting",
        engine = %engine,
        connection = %connection.redacted,
        schema = %settings.schema
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(&settings.database_url)
        .await?;
    let adapter = PostgresAdapter::new(pool);

    let timer = Instant::now();
    let schema = settings.schema.as_str();
    let json = match command {
        Command::Tables => render(&adapter.tables(schema).await?)?,
        Command::Columns(args) => {
            let table = QualifiedIdentifier::new(schema, args.table)?;
            render(&adapter.columns(&table).await?)?
        }
        Command::PrimaryKey(args) => {
            let table = QualifiedIdentifier::new(schema, args.table)?;
            render(&adapter.primary_key(&table).await?)?
        }
        Command::ForeignKeys(args) => {
            let table = QualifiedIdentifier::new(schema, args.table)?;
            render(&adapter.foreign_keys(&table).await?)?
        }
        Command::ProcedureExists(args) => {
            render(&adapter.procedure_exists(schema, &args.name).await?)?
        }
        Command::Describe(args) => {
            let table = QualifiedIdentifier::new(schema, args.table)?;
            render(&adapter.describe_table(&table).await?)?
        }
    };
    tracing::info!(
        event = "introspection_finished",
        duration_ms = timer.elapsed().as_millis() as u64
    );

    match out {
        Some(path) => {
            std::fs::write(&path, format!("{json}\n"))?;
            tracing::info!(event = "output_written", path = %path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn render<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "pgshape.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(
        "database url is required (use --database-url, DATABASE_URL, or database_url in the config file)"
    )]
    MissingDatabaseUrl,
    #[error("invalid setting: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings as written in `pgshape.toml`; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub database_url: Option<String>,
    pub schema: Option<String>,
    pub max_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Values taken from flags or the environment; these win over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub schema: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Fully resolved CLI settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub schema: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn resolve(file: FileSettings, overrides: Overrides) -> ConfigResult<Self> {
        let database_url = overrides
            .database_url
            .or(file.database_url)
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let schema = overrides
            .schema
            .or(file.schema)
            .unwrap_or_else(|| "public".to_string());
        if schema.is_empty() {
            return Err(ConfigError::Invalid("schema must not be empty".to_string()));
        }

        let max_connections = file.max_connections.unwrap_or(5);
        if max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            schema,
            max_connections,
            acquire_timeout: Duration::from_secs(file.acquire_timeout_secs.unwrap_or(10)),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            log_format: overrides.log_format.or(file.log_format).unwrap_or_default(),
        })
    }
}

/// Load the config file at `path`, or `pgshape.toml` if present.
pub fn load_file(path: Option<&Path>) -> ConfigResult<FileSettings> {
    match path {
        Some(path) => read_file(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                read_file(default)
            } else {
                Ok(FileSettings::default())
            }
        }
    }
}

fn read_file(path: &Path) -> ConfigResult<FileSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> FileSettings {
        toml::from_str(content).expect("parse settings")
    }

    #[test]
    fn file_values_fill_in_defaults() {
        let file = parse(
            r#"
            database_url = "postgres://api@localhost/shop"
            schema = "app"
            max_connections = 2
            acquire_timeout_secs = 3
            log_format = "json"
            "#,
        );

        let settings = Settings::resolve(file, Overrides::default()).expect("resolve");
        assert_eq!(settings.database_url, "postgres://api@localhost/shop");
        assert_eq!(settings.schema, "app");
        assert_eq!(settings.max_connections, 2);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(3));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn overrides_win_over_file() {
        let file = parse(
            r#"
            database_url = "postgres://file@localhost/shop"
            schema = "app"
            log_level = "warn"
            "#,
        );
        let overrides = Overrides {
            database_url: Some("postgres://flag@localhost/shop".to_string()),
            schema: Some("billing".to_string()),
            log_level: Some("debug".to_string()),
            log_format: None,
        };

        let settings = Settings::resolve(file, overrides).expect("resolve");
        assert_eq!(settings.database_url, "postgres://flag@localhost/shop");
        assert_eq!(settings.schema, "billing");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn defaults_schema_to_public() {
        let overrides = Overrides {
            database_url: Some("postgres://localhost/shop".to_string()),
            ..Overrides::default()
        };

        let settings = Settings::resolve(FileSettings::default(), overrides).expect("resolve");
        assert_eq!(settings.schema, "public");
        assert_eq!(settings.max_connections, 5);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = Settings::resolve(FileSettings::default(), Overrides::default());
        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn rejects_zero_connections() {
        let file = parse(
            r#"
            database_url = "postgres://localhost/shop"
            max_connections = 0
            "#,
        );
        let result = Settings::resolve(file, Overrides::default());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = toml::from_str::<FileSettings>("database = \"shop\"");
        assert!(result.is_err());
    }
}

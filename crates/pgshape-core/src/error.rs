use thiserror::Error;

/// Core error type shared across pgshape crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// A schema or table identifier could not be constructed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by pgshape crates.
pub type Result<T> = std::result::Result<T, Error>;

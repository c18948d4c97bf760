//! Database error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Invalid stored value in {column}: {message}")]
    InvalidRecord { column: &'static str, message: String },
}

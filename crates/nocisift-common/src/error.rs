use thiserror::Error;

#[derive(Debug, Error)]
pub enum NocisiftError {
    #[error("Invalid value for `{field}`: {message}")]
    Config { field: &'static str, message: String },

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Network capabilities capped: {0}")]
    Security(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NocisiftError {
    /// Field-level configuration error.
    pub fn config(field: &'static str, message: impl Into<String>) -> Self {
        NocisiftError::Config { field, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, NocisiftError>;

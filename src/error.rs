use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("policy not found: {0}")]
    PolicyNotFound(String),

    #[error("malformed condition: {0}")]
    MalformedCondition(String),

    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WardenError>;

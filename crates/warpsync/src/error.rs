use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid or expired API URL: {0}")]
    InvalidApi(String),

    #[error("Cannot deduce uid from records, there may be no gacha record")]
    NoRecords,

    #[error("Invalid uid: {0:?}")]
    InvalidUid(String),

    #[error("Missing field `{0}` in draw record")]
    MissingField(&'static str),

    #[error("Draw record is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No API URL available: {0}")]
    SeedUnavailable(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("No migration registered for schema version {0}")]
    MigrationMissing(u32),

    #[error("Cannot lower schema version from {from} to {to}")]
    SchemaDowngrade { from: u32, to: u32 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Whether the error aborts a sync before anything was written
    pub fn is_fatal_sync(&self) -> bool {
        matches!(self, Error::InvalidApi(_) | Error::NoRecords)
    }
}

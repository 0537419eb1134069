use thiserror::Error;

pub type Result<T> = std::result::Result<T, UpliftError>;

#[derive(Error, Debug)]
pub enum UpliftError {
    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("Unexpected response from {url}: {reason}")]
    Response { url: String, reason: String },
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

// ureq::Error is large; keep it boxed inside the enum
impl From<ureq::Error> for UpliftError {
    fn from(err: ureq::Error) -> Self {
        UpliftError::Http(Box::new(err))
    }
}

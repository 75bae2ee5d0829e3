// Error types for the instagram-api crate.
// Covers missing credentials, transport failures, API status errors, and cache IO.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstagramError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("missing or empty access token")]
    MissingToken,

    #[error("API returned HTTP {0}")]
    Status(u16),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, InstagramError>;

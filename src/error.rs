use thiserror::Error;

/// Failure of a word-list fetch. Always recovered from: the session keeps
/// whatever words it already holds.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid word source url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("word source request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("word source answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("word source returned malformed body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("word source returned no words")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

//! Error types for pack loading and configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PackError>;

/// Failure to fetch or read one pack chunk.
///
/// The registry never lets these escape a load; they are logged and the
/// chunk counts as empty.
#[derive(Error, Debug)]
pub enum PackError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk {0} not found")]
    NotFound(String),

    #[error("chunk {0} could not be decoded as text")]
    Decode(String),

    #[error("chunk {path} is not a JSON array: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

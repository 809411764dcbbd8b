//! Error types for tonearm-session
//!
//! Session operations themselves never fail; engine failures arrive as
//! events. These errors cover bootstrap and script replay.

use thiserror::Error;

/// Main error type for tonearm-session
#[derive(Error, Debug)]
pub enum Error {
    /// Replay script line could not be parsed
    #[error("Script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using tonearm-session Error
pub type Result<T> = std::result::Result<T, Error>;

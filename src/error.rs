//! Error types for the gpsmon library.

use thiserror::Error;

/// Errors that can occur while talking to the tracker or loading configuration.
///
/// Transport failures and non-2xx responses are not distinguished by
/// callers: both downgrade the link to offline and render the same fallback.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error (transport-level).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered with a non-success status code.
    #[error("unexpected status: {0}")]
    BadStatus(reqwest::StatusCode),

    /// I/O error during config file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parsing failed.
    #[error("config parsing failed: {0}")]
    Config(#[from] toml::de::Error),
}

/// A specialized `Result` type for gpsmon operations.
pub type Result<T> = std::result::Result<T, Error>;

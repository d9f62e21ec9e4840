//! Error types for the core library.

use std::path::PathBuf;

/// Why a reply could not be obtained. Every variant is shown to the user as
/// the same fallback message; the variant only shows up in logs.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Connection, DNS or body-read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    /// The body was not the JSON shape the mode expects.
    #[error("could not decode reply: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request task ended without delivering a result.
    #[error("reply task ended without a result")]
    Dropped,
}

/// Errors while locating, reading or writing the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown mode '{0}' (expected 'chat' or 'research')")]
    InvalidMode(String),
}

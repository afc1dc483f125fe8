//! Error types for the admin client

use thiserror::Error;

/// Broad category of an [`Error`], for callers that only care which stage of
/// an invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Resolution,
    Transport,
    Decode,
}

#[derive(Error, Debug)]
pub enum Error {
    /// Unsupported API version, or a missing/invalid base URI
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown command, or parameters that do not fit its template
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Network failure or a request reqwest refused to build
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Request to {url} failed [{status}]: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    /// No bearer token could be obtained for the request
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The response body is not valid JSON
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Resolution(_) => ErrorKind::Resolution,
            Error::Transport(_) | Error::Status { .. } | Error::Authentication(_) => {
                ErrorKind::Transport
            }
            Error::Decode(_) => ErrorKind::Decode,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

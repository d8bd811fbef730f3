//! Error type definitions for the M3U relay
//!
//! The hierarchy mirrors how failures are handled: anything reaching
//! [`AppError`] during startup is fatal, [`RewriteError`] is recovered per
//! track, and [`WebError`] is turned into an HTTP response.

use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Playlist source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Mapping file errors
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Output file creation, write or flush errors
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Mapping file specific errors
///
/// Malformed content is not an error; see
/// [`MappingLoadOutcome`](crate::data_mapping::MappingLoadOutcome).
#[derive(Error, Debug)]
pub enum MappingError {
    /// The mapping file does not exist
    #[error("Mapping file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The mapping file exists but could not be read
    #[error("Failed to read mapping file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-track URL rewrite errors
#[derive(Error, Debug)]
pub enum RewriteError {
    /// The original stream URI could not be parsed
    #[error("Invalid stream URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// The assembled relay URL did not parse back
    #[error("Invalid relay URL '{url}': {source}")]
    InvalidRelayUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Playlist source specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network level failure while fetching a remote playlist
    #[error("Failed to fetch playlist from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP errors from the remote playlist host
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Local playlist file could not be read
    #[error("Failed to read playlist {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Playlist content is not an M3U document
    #[error("Parse error: {message}")]
    ParseError { message: String },
}

/// Web layer specific errors
#[derive(Error, Debug)]
pub enum WebError {
    /// Credentials in the request did not match the relay credentials
    #[error("Invalid credentials")]
    Unauthorized,

    /// Nothing is published at the requested location
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The origin could not be reached or answered with garbage
    #[error("Upstream error: {message}")]
    Upstream { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error bound to the file it happened on
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl SourceError {
    /// Create a parse error
    pub fn parse_error<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }
}

impl WebError {
    /// Create a not found error for a resource description
    pub fn not_found<R: Into<String>>(resource: R) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an upstream error
    pub fn upstream<M: Into<String>>(message: M) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

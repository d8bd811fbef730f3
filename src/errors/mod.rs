//! Centralized error handling for the M3U relay
//!
//! This module unifies the error types used across startup, playlist
//! rewriting and the serving layer.
//!
//! # Error Categories
//!
//! - **Startup Errors**: playlist load, mapping file I/O and output file
//!   failures. These abort the process before any connection is accepted.
//! - **Rewrite Errors**: a single track whose URI cannot be rewritten. These
//!   never leave the serializer; the track is dropped and logged.
//! - **Web Errors**: request handling failures, rendered as HTTP responses.
//!
//! # Usage
//!
//! ```rust
//! use m3u_relay::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("no playlist source configured"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for playlist source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for URL rewrite Results
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Convenience type alias for Web Results
pub type WebResult<T> = Result<T, WebError>;

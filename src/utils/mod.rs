//! Utility functions for the M3U relay

pub mod url;

pub use self::url::UrlUtils;

//! HTTP request handlers

pub mod health;
pub mod playlist;
pub mod stream;

//! Catalog-specific error types
//!
//! # Error Types
//!
//! - **`FetchError`**: A single page request failed. Stored in the query
//!   cache and shared by every caller waiting on the same request, so it is
//!   `Clone` and carries messages rather than source errors.
//! - **`ClientError`**: The HTTP client could not be constructed.

use thiserror::Error;

/// Message shown when the API fails without explaining why
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Something went wrong";

/// Failure of one catalog page request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not complete (connectivity, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a non-success status
    #[error("{0}")]
    Upstream(String),

    /// The API answered with a success status but an unexpected body
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Build an upstream error from an optional API message
    #[must_use]
    pub fn upstream(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.trim().is_empty() => Self::Upstream(message),
            _ => Self::Upstream(GENERIC_UPSTREAM_MESSAGE.to_string()),
        }
    }
}

/// Errors raised while building the HTTP catalog client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is not a valid URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The URL cannot serve as a base (e.g. `mailto:`)
    #[error("Catalog URL cannot be used as a base: {0}")]
    NotABase(String),

    /// reqwest failed to build the client (TLS backend, ...)
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;

//! Storage-specific error types
//!
//! These errors never leave the `store` module through the public
//! `SearchStore` API: the store degrades to in-memory behavior instead.
//! They are public so custom backends can report failures.
//!
//! # Error Types
//!
//! - **`SledError`**: Errors from the underlying sled embedded database
//! - **`DecodeError`**: Stored bytes were not valid UTF-8
//! - **`Unavailable`**: The backend could not be reached at all

use thiserror::Error;

/// Persisted search store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents a sled database error
    #[error("Database error: {0}")]
    SledError(#[from] sled::Error),

    /// Stored value could not be decoded as a string
    #[error("Error while decoding stored value: {0}")]
    DecodeError(#[from] std::string::FromUtf8Error),

    /// Backend is not available (quota, permissions, missing directory)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;

//! Roster - browse a paginated character catalog and collect favorites
//!
//! This library provides a client for a remote character catalog with
//! per-query caching, request coalescing, pagination driven by the
//! server-reported page count, a persisted search term, and a favorites
//! collection exportable as CSV.

use thiserror::Error;

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod favorites;
pub mod output;
pub mod pagination;
pub mod session;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use catalog::{CatalogPage, Character, PageInfo, QueryKey};

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum RosterError {
    /// The catalog client could not be created
    #[error("Catalog client error: {0}")]
    ClientError(#[from] catalog::ClientError),
    /// Favorites could not be exported
    #[error("Export error: {0}")]
    ExportError(#[from] favorites::ExportError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// The session could not be built
    #[error("Session error: {0}")]
    SessionError(#[from] session::SessionError),
    /// A page segment that is not a positive integer
    #[error("Invalid page: {0}")]
    PageError(#[from] pagination::PageParseError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

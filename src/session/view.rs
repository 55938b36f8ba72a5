//! View selection
//!
//! What the host renders is a pure function of the active key's cache
//! entry: loading while pending, the error view when errored, results when
//! resolved. Resolved data is never shown under an errored status.

use crate::cache::{CacheEntry, EntryState, EntryStatus};
use crate::catalog::CatalogPage;

/// Which view to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Loading,
    Error,
    Results,
}

/// Select the view for an entry status; a missing entry is still loading
#[must_use]
pub const fn select_view(status: Option<EntryStatus>) -> ViewKind {
    match status {
        None | Some(EntryStatus::Pending) => ViewKind::Loading,
        Some(EntryStatus::Errored) => ViewKind::Error,
        Some(EntryStatus::Resolved) => ViewKind::Results,
    }
}

/// Render input for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading,
    /// Recoverable error with its message; the host offers a reload
    Error { message: String },
    /// A page of results, possibly empty
    Results(CatalogPage),
}

impl View {
    /// Build the view for an entry of the active key
    #[must_use]
    pub fn from_entry(entry: Option<&CacheEntry>) -> Self {
        match (select_view(entry.map(CacheEntry::status)), entry.map(CacheEntry::state)) {
            (ViewKind::Results, Some(EntryState::Resolved(page))) => Self::Results(page.clone()),
            (ViewKind::Error, Some(EntryState::Errored(error))) => Self::Error {
                message: error.to_string(),
            },
            _ => Self::Loading,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ViewKind {
        match self {
            Self::Loading => ViewKind::Loading,
            Self::Error { .. } => ViewKind::Error,
            Self::Results(_) => ViewKind::Results,
        }
    }
}

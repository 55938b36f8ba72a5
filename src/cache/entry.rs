//! Cache entries and their status

use std::time::{Duration, Instant};

use crate::catalog::{CatalogPage, FetchError, QueryKey};

/// Status of a cache entry, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Resolved,
    Errored,
}

/// Payload of a cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// First fetch for this key is in flight
    Pending,
    /// Last successful response for this key
    Resolved(CatalogPage),
    /// Last fetch for this key failed
    Errored(FetchError),
}

/// One cached query result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub(crate) key: QueryKey,
    pub(crate) state: EntryState,
    pub(crate) last_accessed: u64,
    pub(crate) resolved_at: Option<Instant>,
    pub(crate) invalidated: bool,
    pub(crate) revalidating: bool,
}

impl CacheEntry {
    pub(crate) const fn pending(key: QueryKey, tick: u64) -> Self {
        Self {
            key,
            state: EntryState::Pending,
            last_accessed: tick,
            resolved_at: None,
            invalidated: false,
            revalidating: false,
        }
    }

    pub(crate) fn resolved(key: QueryKey, page: CatalogPage, tick: u64) -> Self {
        let mut entry = Self::pending(key, tick);
        entry.resolve(page);
        entry
    }

    /// A refetch is starting.
    ///
    /// Resolved data stays visible while it runs; anything else goes back
    /// to pending.
    pub(crate) fn begin_refetch(&mut self) {
        if matches!(self.state, EntryState::Resolved(_)) {
            self.revalidating = true;
        } else {
            self.state = EntryState::Pending;
        }
    }

    /// The refetch was dropped before it finished.
    ///
    /// Returns `true` when nothing is left worth keeping (the entry was
    /// still pending); resolved data just stops revalidating.
    pub(crate) fn abandon_refetch(&mut self) -> bool {
        self.revalidating = false;
        matches!(self.state, EntryState::Pending)
    }

    pub(crate) fn resolve(&mut self, page: CatalogPage) {
        self.state = EntryState::Resolved(page);
        self.resolved_at = Some(Instant::now());
        self.invalidated = false;
        self.revalidating = false;
    }

    pub(crate) fn fail(&mut self, error: FetchError) {
        self.state = EntryState::Errored(error);
        self.revalidating = false;
    }

    /// Resolved data that may be served without a network call
    pub(crate) fn fresh_data(&self, stale_after: Option<Duration>) -> Option<&CatalogPage> {
        let EntryState::Resolved(page) = &self.state else {
            return None;
        };
        if self.invalidated {
            return None;
        }
        match (stale_after, self.resolved_at) {
            (Some(window), Some(at)) if at.elapsed() > window => None,
            _ => Some(page),
        }
    }

    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }

    #[must_use]
    pub const fn state(&self) -> &EntryState {
        &self.state
    }

    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        match self.state {
            EntryState::Pending => EntryStatus::Pending,
            EntryState::Resolved(_) => EntryStatus::Resolved,
            EntryState::Errored(_) => EntryStatus::Errored,
        }
    }

    /// Resolved payload, if any
    #[must_use]
    pub const fn data(&self) -> Option<&CatalogPage> {
        match &self.state {
            EntryState::Resolved(page) => Some(page),
            _ => None,
        }
    }

    /// Error message, if the last fetch failed
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        match &self.state {
            EntryState::Errored(error) => Some(error),
            _ => None,
        }
    }

    /// Logical access epoch used for LRU eviction
    #[must_use]
    pub const fn last_accessed(&self) -> u64 {
        self.last_accessed
    }

    /// Whether a background revalidation is running for resolved data
    #[must_use]
    pub const fn is_revalidating(&self) -> bool {
        self.revalidating
    }
}

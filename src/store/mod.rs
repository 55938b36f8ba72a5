//! Persisted search store
//!
//! Keeps the last search term across sessions under a single fixed key.
//! The durable backend is a sled database; when it cannot be opened or a
//! write fails, the store keeps working from its in-memory copy for the
//! rest of the session. Callers never see a storage error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use sled::Db;
use tracing::{debug, warn};

pub mod error;

pub use error::StoreError;

/// Key under which the search term is stored
pub const SEARCH_KEY: &str = "search_term";

/// Durable key-value backend for the search store
pub trait SearchBackend {
    /// Load the value stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read or the value is corrupt.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the value cannot be written durably.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Sled-backed storage
pub struct SledBackend {
    db: Db,
}

impl SledBackend {
    /// Opens or creates a sled database at the specified directory
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened (e.g. the path
    /// is a regular file or the directory is not writable).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }
}

impl SearchBackend for SledBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.db.get(key)? {
            Some(bytes) => Ok(Some(String::from_utf8(bytes.to_vec())?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db.insert(key, value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

/// Volatile backend, used in tests and as an explicit no-persistence mode
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RefCell<HashMap<String, String>>,
}

impl SearchBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Last-search-term store with best-effort persistence
pub struct SearchStore {
    backend: Option<Box<dyn SearchBackend>>,
    value: String,
}

impl SearchStore {
    /// Open the store in the given directory
    ///
    /// Never fails: if the sled database cannot be opened the store runs
    /// in memory only and starts from the empty default.
    ///
    /// # Examples
    /// ```no_run
    /// use roster::store::SearchStore;
    /// let store = SearchStore::open("/tmp/roster-data");
    /// println!("last search: {}", store.read());
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        match SledBackend::open(path.as_ref()) {
            Ok(backend) => Self::with_backend(Box::new(backend)),
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "search store unavailable, using memory only");
                Self::in_memory()
            }
        }
    }

    /// Build a store over an arbitrary backend, reading the initial value
    #[must_use]
    pub fn with_backend(backend: Box<dyn SearchBackend>) -> Self {
        let value = match backend.load(SEARCH_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "failed to read stored search term");
                String::new()
            }
        };
        debug!(%value, "loaded search term");
        Self {
            backend: Some(backend),
            value,
        }
    }

    /// A store without any durable backend
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            backend: None,
            value: String::new(),
        }
    }

    /// Current search term, or the empty default
    #[must_use]
    pub fn read(&self) -> &str {
        &self.value
    }

    /// Replace the search term
    ///
    /// The in-memory value always changes; persisting it is best-effort.
    pub fn write(&mut self, value: impl Into<String>) {
        self.value = value.into();
        if let Some(backend) = &self.backend
            && let Err(e) = backend.save(SEARCH_KEY, &self.value)
        {
            warn!(error = %e, "failed to persist search term");
        }
    }

    /// Whether a durable backend is attached
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        self.backend.is_some()
    }
}

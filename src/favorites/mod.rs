//! Favorites collection
//!
//! An insertion-ordered set of characters, unique by id. Lives for the
//! process only; the CSV export is a pure projection of its members.

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::Character;

pub mod export;

pub use export::{CSV_MIME, ExportArtifact, ExportError, export_filename, to_csv};

/// Characters the user marked as favorite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    members: IndexMap<String, Character>,
}

impl Favorites {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character; no-op if its id is already present
    ///
    /// Returns `true` if the character was inserted.
    pub fn add(&mut self, item: Character) -> bool {
        if self.members.contains_key(&item.id) {
            return false;
        }
        debug!(id = %item.id, "adding favorite");
        self.members.insert(item.id.clone(), item);
        true
    }

    /// Remove a character by id; no-op if absent
    ///
    /// Returns `true` if a member was removed.
    pub fn remove(&mut self, item: &Character) -> bool {
        self.remove_id(&item.id)
    }

    /// Remove by id; no-op if absent
    pub fn remove_id(&mut self, id: &str) -> bool {
        let removed = self.members.shift_remove(id).is_some();
        if removed {
            debug!(%id, "removed favorite");
        }
        removed
    }

    /// Add if absent, remove if present
    ///
    /// Returns whether the character is a favorite afterwards.
    pub fn toggle(&mut self, item: Character) -> bool {
        if self.remove(&item) {
            false
        } else {
            self.add(item)
        }
    }

    /// Remove every member, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let ids: Vec<String> = self.members.keys().cloned().collect();
        for id in &ids {
            self.remove_id(id);
        }
        ids.len()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Character> {
        self.members.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.members.values()
    }

    /// CSV body of the export, one member per line
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if CSV serialization fails.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        to_csv(self.iter())
    }

    /// Full download artifact, named after the current member count
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if CSV serialization fails.
    pub fn export(&self) -> Result<ExportArtifact, ExportError> {
        Ok(ExportArtifact::new(self.len(), self.export_csv()?))
    }
}

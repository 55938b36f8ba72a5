//! Testing utilities for roster
//!
//! Provides a canned `FakeCatalog` source and helpers to build characters
//! and pages.
//!
//! Only available when compiled with `cfg(test)`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::Notify;

use crate::catalog::{CatalogPage, CatalogSource, Character, FetchError, PageInfo, QueryKey};

/// In-process catalog with canned responses
///
/// Records every request. Keys without a canned response resolve to an
/// empty single-page result. A key can be gated: requests for it wait until
/// the returned `Notify` is signalled once per request.
#[derive(Default)]
pub struct FakeCatalog {
    responses: RefCell<HashMap<QueryKey, Result<CatalogPage, FetchError>>>,
    gates: RefCell<HashMap<QueryKey, Rc<Notify>>>,
    calls: RefCell<Vec<QueryKey>>,
}

impl FakeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response for a key, replacing any previous one
    pub fn respond(&self, key: &QueryKey, response: Result<CatalogPage, FetchError>) {
        self.responses.borrow_mut().insert(key.clone(), response);
    }

    /// Hold requests for `key` until the returned handle is notified
    pub fn gate(&self, key: &QueryKey) -> Rc<Notify> {
        Rc::clone(
            self.gates
                .borrow_mut()
                .entry(key.clone())
                .or_insert_with(|| Rc::new(Notify::new())),
        )
    }

    /// Every request received, in order
    #[must_use]
    pub fn calls(&self) -> Vec<QueryKey> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    #[must_use]
    pub fn calls_for(&self, key: &QueryKey) -> usize {
        self.calls.borrow().iter().filter(|k| *k == key).count()
    }
}

impl CatalogSource for FakeCatalog {
    async fn fetch_page(&self, key: &QueryKey) -> Result<CatalogPage, FetchError> {
        self.calls.borrow_mut().push(key.clone());

        let gate = self.gates.borrow().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.responses
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Ok(page_of(Vec::new(), 1)))
    }
}

/// A human, alive, male character with the given id and name
#[must_use]
pub fn character(id: &str, name: &str) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        image: format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
        gender: "Male".to_string(),
        species: "Human".to_string(),
        status: "Alive".to_string(),
    }
}

/// A page with the given items and page count
#[must_use]
pub fn page_of(items: Vec<Character>, page_count: u32) -> CatalogPage {
    CatalogPage {
        items,
        info: PageInfo {
            page_count,
            next_page_token: None,
        },
    }
}

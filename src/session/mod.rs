//! Session orchestration
//!
//! `Session` is the composition root of the client: it owns the pagination
//! state, the persisted search store, the favorites collection and the
//! query cache, and keeps them in sync.
//!
//! # Workflow
//!
//! ```text
//! route page / pager / search input
//!     ↓
//! PaginationState + SearchStore ──→ QueryKey (made active)
//!     ↓
//! QueryCache::fetch ──→ CatalogSource (only on miss)
//!     ↓
//! key still active? ──no──→ ignore (entry for that key is still cached)
//!     ↓ yes
//! FetchSucceeded(page_count) ──→ PaginationState::last_page
//!     ↓
//! select_view(active entry) ──→ Loading | Error | Results
//! ```
//!
//! Every fetch is tagged with its key; a response only touches visible
//! state if its key is still the active one when it arrives.

use std::cell::RefCell;

use tracing::debug;

use crate::cache::{CacheConfig, FetchResult, QueryCache};
use crate::catalog::{CatalogSource, Character, QueryKey};
use crate::favorites::{ExportArtifact, ExportError, Favorites};
use crate::pagination::{PageNumber, PaginationState};
use crate::store::SearchStore;

pub mod view;

pub use view::{View, ViewKind, select_view};

/// Session result type
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while setting up a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to build session: {0}")]
    BuildError(String),
}

/// One user session over the catalog
pub struct Session<S> {
    cache: QueryCache<S>,
    pagination: RefCell<PaginationState>,
    search_store: RefCell<SearchStore>,
    favorites: RefCell<Favorites>,
}

impl<S: CatalogSource + 'static> Session<S> {
    /// Create a new builder for constructing a `Session`
    #[must_use]
    pub fn builder() -> SessionBuilder<S> {
        SessionBuilder::new()
    }

    /// Key for the current search term and page
    #[must_use]
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(
            self.search_store.borrow().read(),
            self.pagination.borrow().current_page().to_string(),
        )
    }

    /// Make the current key active and resolve it
    pub async fn refresh(&self) -> View {
        let key = self.query_key();
        self.cache.set_active(Some(key.clone()));
        let result = self.cache.fetch(key.clone()).await;
        self.apply(&key, &result);
        self.view()
    }

    /// The search input changed
    pub async fn search(&self, term: impl Into<String>) -> View {
        self.search_store.borrow_mut().write(term);
        self.refresh().await
    }

    /// The route's page segment changed
    pub async fn navigate(&self, page: PageNumber) -> View {
        self.pagination.borrow_mut().navigate(page);
        self.refresh().await
    }

    /// The user picked a page in the pager
    pub async fn paginate(&self, page: PageNumber) -> View {
        self.pagination.borrow_mut().user_paginate(page);
        self.refresh().await
    }

    /// Go to the next page, if the pager offers one
    pub async fn next_page(&self) -> Option<View> {
        let target = self.pagination.borrow().next_page()?;
        Some(self.paginate(target).await)
    }

    /// Go to the previous page, if there is one
    pub async fn previous_page(&self) -> Option<View> {
        let target = self.pagination.borrow().previous_page()?;
        Some(self.paginate(target).await)
    }

    /// The host window regained focus: revalidate the active key
    ///
    /// Resolved data stays on screen until the new result lands.
    pub async fn focus(&self) -> View {
        let Some(key) = self.cache.active() else {
            return self.refresh().await;
        };
        let result = self.cache.revalidate(key.clone()).await;
        self.apply(&key, &result);
        self.view()
    }

    /// Manual retry: refetch the current key regardless of its state
    pub async fn reload(&self) -> View {
        let key = self.query_key();
        self.cache.invalidate(&key);
        self.refresh().await
    }

    fn apply(&self, key: &QueryKey, result: &FetchResult) {
        if !self.cache.is_active(key) {
            debug!(%key, "ignoring response for inactive key");
            return;
        }
        if let Ok(page) = result {
            self.pagination
                .borrow_mut()
                .fetch_succeeded(page.info.page_count);
        }
    }

    /// View for the active key
    #[must_use]
    pub fn view(&self) -> View {
        match self.cache.active() {
            Some(key) => View::from_entry(self.cache.peek(&key).as_ref()),
            None => View::Loading,
        }
    }

    #[must_use]
    pub fn pagination(&self) -> PaginationState {
        *self.pagination.borrow()
    }

    #[must_use]
    pub fn search_term(&self) -> String {
        self.search_store.borrow().read().to_string()
    }

    /// Whether the search term survives a restart
    #[must_use]
    pub fn is_search_durable(&self) -> bool {
        self.search_store.borrow().is_durable()
    }

    /// Link to the next page reported with the active results
    #[must_use]
    pub fn next_page_token(&self) -> Option<String> {
        let key = self.cache.active()?;
        let entry = self.cache.peek(&key)?;
        entry.data()?.info.next_page_token.clone()
    }

    /// Look up a character among the active results
    #[must_use]
    pub fn find_character(&self, id: &str) -> Option<Character> {
        let key = self.cache.active()?;
        let entry = self.cache.peek(&key)?;
        entry.data()?.find(id).cloned()
    }

    pub fn add_favorite(&self, item: Character) -> bool {
        self.favorites.borrow_mut().add(item)
    }

    pub fn remove_favorite(&self, id: &str) -> bool {
        self.favorites.borrow_mut().remove_id(id)
    }

    pub fn toggle_favorite(&self, item: Character) -> bool {
        self.favorites.borrow_mut().toggle(item)
    }

    /// Deselect all favorites, returning how many were removed
    pub fn clear_favorites(&self) -> usize {
        self.favorites.borrow_mut().clear()
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.borrow().contains(id)
    }

    /// Snapshot of the favorites collection
    #[must_use]
    pub fn favorites(&self) -> Favorites {
        self.favorites.borrow().clone()
    }

    /// CSV download artifact of the current favorites
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if CSV serialization fails.
    pub fn export(&self) -> std::result::Result<ExportArtifact, ExportError> {
        self.favorites.borrow().export()
    }

    #[must_use]
    pub const fn cache(&self) -> &QueryCache<S> {
        &self.cache
    }
}

/// Builder for `Session`
///
/// ```no_run
/// # use roster::catalog::{CatalogClientConfig, HttpCatalog};
/// # use roster::session::Session;
/// # use roster::store::SearchStore;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Session::builder()
///     .source(HttpCatalog::new(&CatalogClientConfig::default())?)
///     .store(SearchStore::open("/tmp/roster"))
///     .route_page(Some("2".parse()?))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder<S> {
    source: Option<S>,
    store: Option<SearchStore>,
    route_page: Option<PageNumber>,
    cache_config: CacheConfig,
}

impl<S: CatalogSource + 'static> SessionBuilder<S> {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            store: None,
            route_page: None,
            cache_config: CacheConfig::default(),
        }
    }

    /// Set the catalog source (required)
    #[must_use]
    pub fn source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the search store; defaults to an in-memory store
    #[must_use]
    pub fn store(mut self, store: SearchStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Page segment of the route at startup
    #[must_use]
    pub const fn route_page(mut self, page: Option<PageNumber>) -> Self {
        self.route_page = page;
        self
    }

    #[must_use]
    pub const fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Build the `Session`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BuildError` if no catalog source was provided.
    pub fn build(self) -> Result<Session<S>> {
        let source = self
            .source
            .ok_or_else(|| SessionError::BuildError("Catalog source is required".to_string()))?;

        Ok(Session {
            cache: QueryCache::new(source, self.cache_config),
            pagination: RefCell::new(PaginationState::new(self.route_page)),
            search_store: RefCell::new(self.store.unwrap_or_else(SearchStore::in_memory)),
            favorites: RefCell::new(Favorites::new()),
        })
    }
}

impl<S: CatalogSource + 'static> Default for SessionBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

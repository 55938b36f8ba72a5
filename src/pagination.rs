//! Pagination state machine
//!
//! Holds the page being viewed and the last page reported by the catalog.
//! `current_page` is written by navigation (route changes) and explicit
//! pager actions; `last_page` is written only by successful fetches.
//! No transition clamps `current_page` to `last_page`: a page past the end
//! is a valid request that yields an empty result.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use thiserror::Error;

/// Error for a page segment that is not a positive integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid page number: {0:?} (expected a positive integer)")]
pub struct PageParseError(pub String);

/// A positive, 1-based page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Create a page number, `None` for zero
    #[must_use]
    pub const fn new(page: u32) -> Option<Self> {
        match NonZeroU32::new(page) {
            Some(page) => Some(Self(page)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The following page, `None` on overflow
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// The preceding page, `None` on the first page
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        Self::new(self.get() - 1)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageNumber {
    type Err = PageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<NonZeroU32>()
            .map(Self)
            .map_err(|_| PageParseError(s.to_string()))
    }
}

/// Inputs that move the pagination state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The route's page segment changed
    Navigate(PageNumber),
    /// The user clicked a pager control
    UserPaginate(PageNumber),
    /// A fetch for the active key succeeded with this page count
    FetchSucceeded(u32),
}

/// Current and last page of the active search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationState {
    current_page: PageNumber,
    last_page: Option<u32>,
}

impl PaginationState {
    /// Initial state, from the route's page segment if there is one
    #[must_use]
    pub fn new(route_page: Option<PageNumber>) -> Self {
        Self {
            current_page: route_page.unwrap_or_default(),
            last_page: None,
        }
    }

    /// Apply a transition
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Navigate(page) | Transition::UserPaginate(page) => {
                self.current_page = page;
            }
            // An empty result reports 0 pages; there is still one (empty) page.
            Transition::FetchSucceeded(page_count) => {
                self.last_page = Some(page_count.max(1));
            }
        }
    }

    pub fn navigate(&mut self, page: PageNumber) {
        self.apply(Transition::Navigate(page));
    }

    pub fn user_paginate(&mut self, page: PageNumber) {
        self.apply(Transition::UserPaginate(page));
    }

    pub fn fetch_succeeded(&mut self, page_count: u32) {
        self.apply(Transition::FetchSucceeded(page_count));
    }

    #[must_use]
    pub const fn current_page(&self) -> PageNumber {
        self.current_page
    }

    /// Last page of the latest successful fetch, `None` before any
    #[must_use]
    pub const fn last_page(&self) -> Option<u32> {
        self.last_page
    }

    /// Target of a "next" control
    ///
    /// Offered while the last page is unknown or not yet reached.
    #[must_use]
    pub fn next_page(&self) -> Option<PageNumber> {
        match self.last_page {
            Some(last) if self.current_page.get() >= last => None,
            _ => self.current_page.next(),
        }
    }

    /// Target of a "previous" control
    #[must_use]
    pub fn previous_page(&self) -> Option<PageNumber> {
        self.current_page.previous()
    }
}

//! Catalog data types
//!
//! `Character`, `CatalogPage` and `QueryKey` are the values that flow between
//! the HTTP client, the query cache and the session. The `*Response` types
//! mirror the wire format of the remote API and are converted into
//! `CatalogPage` right after decoding.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Identity of one cached catalog request
///
/// Two keys are equal iff both fields are equal. No normalization is
/// applied: `"rick"` and `"Rick"` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub search_term: String,
    pub page: String,
}

impl QueryKey {
    /// Create a new key from a search term and a page segment
    #[must_use]
    pub fn new(search_term: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            page: page.into(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name={:?} page={}", self.search_term, self.page)
    }
}

/// A catalog item, identified by `id`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Character {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    pub image: String,
    pub gender: String,
    pub species: String,
    pub status: String,
}

/// Pagination info reported by the API alongside a page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Total number of pages for the current search term
    pub page_count: u32,
    /// Link to the next page, `None` on the last page
    pub next_page_token: Option<String>,
}

/// One page of catalog results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub items: Vec<Character>,
    pub info: PageInfo,
}

impl CatalogPage {
    /// Find an item on this page by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Character> {
        self.items.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Successful response body of `GET /character/`
#[derive(Debug, Deserialize)]
pub(crate) struct CharacterResponse {
    results: Vec<Character>,
    info: InfoResponse,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    pages: u32,
    next: Option<String>,
}

impl From<CharacterResponse> for CatalogPage {
    fn from(response: CharacterResponse) -> Self {
        Self {
            items: response.results,
            info: PageInfo {
                page_count: response.info.pages,
                next_page_token: response.info.next,
            },
        }
    }
}

/// Error body of a non-success response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: Option<String>,
}

/// The API sends numeric ids; accept strings too and keep the decimal form.
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

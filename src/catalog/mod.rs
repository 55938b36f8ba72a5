//! Remote character catalog
//!
//! Provides the data types of the catalog, the `CatalogSource` seam used by
//! the query cache, and the reqwest-based `HttpCatalog` implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::{CatalogClientConfig, CatalogSource, DEFAULT_CATALOG_URL, HttpCatalog};
pub use error::{ClientError, FetchError, GENERIC_UPSTREAM_MESSAGE};
pub use types::{CatalogPage, Character, PageInfo, QueryKey};

//! HTTP client for the remote character catalog

use std::fmt::Debug;
use std::rc::Rc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument};
use url::Url;

use super::error::{ClientError, FetchError};
use super::types::{CatalogPage, CharacterResponse, ErrorResponse, QueryKey};

/// Default public endpoint of the catalog
pub const DEFAULT_CATALOG_URL: &str = "https://rickandmortyapi.com/api";

/// Anything that can resolve a `QueryKey` into a page of results.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog API via [`HttpCatalog`]
/// - **Fake** (tests): canned responses without HTTP
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Fetch one page for the given search term and page segment.
    async fn fetch_page(&self, key: &QueryKey) -> Result<CatalogPage, FetchError>;
}

impl<T: CatalogSource + ?Sized> CatalogSource for Rc<T> {
    async fn fetch_page(&self, key: &QueryKey) -> Result<CatalogPage, FetchError> {
        (**self).fetch_page(key).await
    }
}

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL of the API, e.g. `https://rickandmortyapi.com/api`
    pub catalog_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// reqwest-backed [`CatalogSource`]
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoint: Url,
}

impl Debug for HttpCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpCatalog {
    /// Create a new catalog client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &CatalogClientConfig) -> Result<Self, ClientError> {
        let endpoint = character_endpoint(&config.catalog_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Full request URL for a key.
    ///
    /// `name` is always sent, an empty value meaning "no filter".
    #[must_use]
    pub fn request_url(&self, key: &QueryKey) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("page", &key.page)
            .append_pair("name", &key.search_term);
        url
    }
}

impl CatalogSource for HttpCatalog {
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch_page(&self, key: &QueryKey) -> Result<CatalogPage, FetchError> {
        let url = self.request_url(key);
        debug!(%url, "requesting catalog page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            // Bodies that are not the documented `{ error }` shape (proxies,
            // HTML error pages) fall back to the generic message.
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .and_then(|b| b.error);
            let error = FetchError::upstream(message);
            debug!(%status, %error, "catalog returned an error");
            return Err(error);
        }

        let parsed: CharacterResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;
        let page = CatalogPage::from(parsed);
        debug!(
            items = page.items.len(),
            pages = page.info.page_count,
            "received catalog page"
        );
        Ok(page)
    }
}

/// Resolve `<base>/character/`, keeping any path prefix of the base.
fn character_endpoint(base: &str) -> Result<Url, ClientError> {
    let mut base = Url::parse(base)?;
    if base.cannot_be_a_base() {
        return Err(ClientError::NotABase(base.to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("character/")?)
}

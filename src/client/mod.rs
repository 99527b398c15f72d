use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::Config;
use crate::token::{CredentialProvider, TokenCache};

mod impls;
pub(crate) mod request;

/// Query parameters; `None` values are left out of the query string.
pub type Query = BTreeMap<String, Option<String>>;

/// Client for a single project of the remote service.
///
/// Cloning is cheap and clones share one token cache.
#[derive(Clone)]
pub struct DataGraphsClient {
    config: Arc<Config>,
    http: Client,
    tokens: Arc<TokenCache>,
    provider: CredentialProvider,
}

/// Per-call options for [`DataGraphsClient`] requests.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub query: Option<Query>,
    /// Merged over the default headers; entries here win.
    pub headers: HeaderMap,
    /// Appends a `t={epoch millis}` parameter to get past intermediate caches.
    pub bypass_cache: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(Query::new)
            .insert(key.into(), Some(value.into()));
        self
    }

    pub fn query_opt(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.query
            .get_or_insert_with(Query::new)
            .insert(key.into(), value.map(Into::into));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn bypass_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }
}

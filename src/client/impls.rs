use std::sync::Arc;

use jiff::Timestamp;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Body, Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    DataGraphsClient, RequestOptions,
    client::request::{build_headers, build_url},
    config::Config,
    errors::Error,
    response::check_response,
    token::{CredentialProvider, RefreshPolicy, TokenCache},
};

const USER_AGENT: &str = "datagraphs-rust-sdk/0.1.0";

impl DataGraphsClient {
    /// Create a new DataGraphsClient
    /// # Arguments
    /// * `config` - Explicit configuration (`Config`), typically loaded via `Config::from_file` or `Config::from_env`.
    ///
    /// Fails with [`Error::Config`] when `project_id` or `api_key` is missing.
    /// `client_id`/`client_secret` are only checked when a call needs them.
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_policy(config, RefreshPolicy::default())
    }

    pub fn with_policy(config: Config, policy: RefreshPolicy) -> Result<Self, Error> {
        config.validate()?;
        for (what, host) in [("API", config.api_host()), ("auth", config.auth_host())] {
            reqwest::Url::parse(host).map_err(|e| {
                Error::Config(format!("Invalid {} host URL '{}': {}", what, host, e))
            })?;
        }
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        let provider = CredentialProvider::new(http.clone(), &config);
        let tokens = TokenCache::new(policy).with_context(format!("project:{}", config.project_id));
        Ok(Self {
            config: Arc::new(config),
            http,
            tokens: Arc::new(tokens),
            provider,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a usable bearer token, refreshing it when missing, expiring or forced.
    ///
    /// A configured override token is returned as-is and never cached or decoded.
    pub async fn access_token(&self, force_refresh: bool) -> Result<String, Error> {
        if let Some(token) = self.provider.override_token() {
            return Ok(token.to_string());
        }
        let provider = self.provider.clone();
        self.tokens
            .get_token(force_refresh, move || async move {
                provider.fetch_new_token().await
            })
            .await
    }

    /// Target URL for `path`, including the cache-busting parameter when requested.
    pub fn url_for(&self, path: &str, options: &RequestOptions) -> String {
        let cache_buster = options
            .bypass_cache
            .then(|| Timestamp::now().as_millisecond());
        build_url(
            self.config.api_host(),
            &self.config.project_id,
            path,
            options.query.as_ref(),
            cache_buster,
        )
    }

    /// Sends a request and returns the successful response unread.
    ///
    /// Non-success statuses come back as [`Error::Api`]; failures to reach the
    /// server come back as [`Error::Http`].
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        if method != Method::GET && method != Method::HEAD {
            self.config.require_client_credentials()?;
        }
        let url = self.url_for(path, &options);
        let bearer = if self.config.uses_delegated_auth() {
            Some(self.access_token(false).await?)
        } else {
            None
        };
        let headers = build_headers(&self.config.api_key, &options.headers, bearer.as_deref())?;

        debug!(method = %method, url = %url, "api.request");
        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        let resp = request.send().await?;
        check_response(resp).await
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Response, Error> {
        self.send(Method::GET, path, None, options).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.send(Method::POST, path, Some(body.into()), options)
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.send(Method::PUT, path, Some(body.into()), options).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.send(Method::PATCH, path, Some(body.into()), options)
            .await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Response, Error> {
        self.send(Method::DELETE, path, None, options).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, Error> {
        let resp = self.get(path, options).await?;
        read_json(resp).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.send_json(Method::POST, path, body, options).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.send_json(Method::PUT, path, body, options).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.send_json(Method::PATCH, path, body, options).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        mut options: RequestOptions,
    ) -> Result<T, Error> {
        let payload = serde_json::to_vec(body)?;
        options
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let resp = self
            .send(method, path, Some(Body::from(payload)), options)
            .await?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

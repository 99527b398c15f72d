use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::errors::Error;

use super::Query;

pub(crate) const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// `{host}/{project_id}/{path}` plus the encoded query string.
///
/// `cache_buster` is the epoch-millis value appended as `t` when the caller
/// asked to bypass caches.
pub(crate) fn build_url(
    host: &str,
    project_id: &str,
    path: &str,
    query: Option<&Query>,
    cache_buster: Option<i64>,
) -> String {
    let mut url = format!("{host}/{project_id}/{path}");
    let mut pairs: Vec<String> = query
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            value.as_ref().map(|value| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
        })
        .collect();
    if let Some(millis) = cache_buster {
        pairs.push(format!("t={millis}"));
    }
    if !pairs.is_empty() {
        url.push('?');
        url.push_str(&pairs.join("&"));
    }
    url
}

/// Default `x-api-key` header, caller headers over it, then the bearer token.
pub(crate) fn build_headers(
    api_key: &str,
    caller: &HeaderMap,
    bearer: Option<&str>,
) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, header_value(api_key, "API key")?);
    headers.extend(caller.clone());
    if let Some(token) = bearer {
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {token}"), "access token")?,
        );
    }
    Ok(headers)
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("{what} is not a valid header value: {e}")))
}

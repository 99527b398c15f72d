//! Turns non-success responses into [`ApiError`]s.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::warn;

use crate::errors::{ApiError, Error};

/// Passes successful responses through untouched and converts everything else
/// into [`Error::Api`].
///
/// A body that declares `application/json` but does not parse surfaces as
/// [`Error::Json`] rather than an API error.
pub async fn check_response(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = resp.text().await?;
    let api_error = classify(status, content_type.as_deref(), body)?;
    warn!(
        status = api_error.status_code,
        url = %url,
        error = api_error.error.as_deref().unwrap_or_default(),
        "api.request_failed"
    );
    Err(Error::Api(api_error))
}

pub fn classify(
    status: StatusCode,
    content_type: Option<&str>,
    body: String,
) -> Result<ApiError, Error> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    let (json, error) = if is_json {
        let json: Value = serde_json::from_str(&body)?;
        let error = json
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned);
        (Some(json), error)
    } else {
        (None, None)
    };
    Ok(ApiError {
        status_code: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
        json,
        error,
    })
}

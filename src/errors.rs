use std::fmt;
use std::sync::Arc;

/// Structured failure for a non-success HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status_code: u16,
    /// Canonical reason phrase; empty for codes that have none (e.g. `599`).
    pub status_text: String,
    /// Raw response body.
    pub body: String,
    /// Parsed body when the response declared `application/json`.
    pub json: Option<serde_json::Value>,
    /// Best-effort human readable message extracted from `json.message`.
    pub error: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code)?;
        if !self.status_text.is_empty() {
            write!(f, " {}", self.status_text)?;
        }
        if let Some(error) = &self.error {
            write!(f, " {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

// Inner errors that are not `Clone` are held behind `Arc` so a failed refresh
// can be handed to every caller awaiting it.
#[derive(Debug, Clone)]
pub enum Error {
    Io(Arc<std::io::Error>),
    Json(Arc<serde_json::Error>),
    Http(Arc<reqwest::Error>),
    Api(ApiError),
    Auth(String),
    Config(String),
    MalformedToken(String),
    InvalidUrn(String),
}

impl Error {
    /// Returns the structured API failure, if the server answered with one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }

    /// Returns the HTTP status of an API failure.
    pub fn status_code(&self) -> Option<u16> {
        self.as_api().map(|api| api.status_code)
    }

    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "json error: {err}"),
            Error::Http(err) => write!(f, "http error: {err}"),
            Error::Api(err) => write!(f, "{err}"),
            Error::Auth(msg) => write!(f, "authentication failed: {msg}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::MalformedToken(msg) => write!(f, "malformed access token: {msg}"),
            Error::InvalidUrn(msg) => write!(f, "invalid urn: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(&**err),
            Error::Json(err) => Some(&**err),
            Error::Http(err) => Some(&**err),
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(Arc::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(Arc::new(err))
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}
